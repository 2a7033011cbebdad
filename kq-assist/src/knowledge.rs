//! Built-in quality-management knowledge table.
//!
//! A static lookup of domain topics that can answer common questions
//! without touching the vector index, together with follow-up questions
//! shown next to each answer.

/// One static domain topic.
#[derive(Debug, Clone)]
pub struct Topic {
    /// Stable topic identifier.
    pub id: &'static str,
    /// Human-readable title.
    pub title: &'static str,
    /// The canned answer body.
    pub body: &'static str,
    /// Keywords that map queries onto this topic. Multi-word keywords are
    /// matched as phrases.
    pub keywords: &'static [&'static str],
    /// Follow-up questions suggested alongside the answer.
    pub follow_ups: &'static [&'static str],
}

/// A matched topic with the number of keyword hits that selected it.
#[derive(Debug, Clone, Copy)]
pub struct TopicMatch<'a> {
    /// The matched topic.
    pub topic: &'a Topic,
    /// How many of the topic's keywords appeared in the query.
    pub hits: usize,
}

/// The static topic table with keyword lookup.
#[derive(Debug)]
pub struct KnowledgeBase {
    topics: Vec<Topic>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self { topics: builtin_topics() }
    }
}

impl KnowledgeBase {
    /// The knowledge base with the built-in quality-management topics.
    pub fn new() -> Self {
        Self::default()
    }

    /// All topics, in table order.
    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    /// Find the topic whose keywords best match the query.
    ///
    /// Matching is case-insensitive; multi-word keywords must appear as a
    /// phrase. Returns `None` when no keyword matches at all.
    pub fn lookup(&self, query: &str) -> Option<TopicMatch<'_>> {
        let query = query.to_lowercase();
        self.topics
            .iter()
            .map(|topic| TopicMatch {
                topic,
                hits: topic.keywords.iter().filter(|kw| query.contains(*kw)).count(),
            })
            .filter(|m| m.hits > 0)
            .max_by_key(|m| m.hits)
    }
}

fn builtin_topics() -> Vec<Topic> {
    vec![
        Topic {
            id: "seven_qc_tools",
            title: "The 7 Quality Control Tools",
            body: "The seven basic QC tools are the workhorses of quality improvement:\n\
                   1. Check sheet - systematic data collection and defect tracking.\n\
                   2. Histogram - frequency distribution of process data.\n\
                   3. Pareto chart - ranks problems so effort goes to the vital few (80/20 rule).\n\
                   4. Cause-and-effect (fishbone/Ishikawa) diagram - structured root cause hunting.\n\
                   5. Scatter diagram - tests relationships between two variables.\n\
                   6. Control chart - monitors process stability over time.\n\
                   7. Stratification - splits data into groups to reveal hidden patterns.",
            keywords: &["7qc", "7 qc", "seven quality", "basic quality tools", "check sheet",
                "histogram", "pareto", "fishbone", "ishikawa", "scatter diagram",
                "control chart", "stratification"],
            follow_ups: &[
                "When should I use a Pareto chart instead of a histogram?",
                "How do I build a control chart for my process?",
                "What goes on the branches of a fishbone diagram?",
            ],
        },
        Topic {
            id: "six_sigma",
            title: "Six Sigma and DMAIC",
            body: "Six Sigma is a data-driven methodology for reducing process variation, \
                   aiming at no more than 3.4 defects per million opportunities. Existing \
                   processes are improved with DMAIC: Define the problem, Measure current \
                   performance, Analyze root causes, Improve the process, and Control the \
                   gains. New processes are designed with DMADV. Statistical rigor and \
                   process-capability thinking are what set it apart.",
            keywords: &["six sigma", "6 sigma", "dmaic", "dmadv", "process capability",
                "defects per million"],
            follow_ups: &[
                "What happens in each DMAIC phase?",
                "How is Six Sigma different from lean?",
                "What is a process capability index?",
            ],
        },
        Topic {
            id: "pdca",
            title: "The PDCA Cycle",
            body: "PDCA (Plan-Do-Check-Act), also called the Deming cycle, is the basic \
                   loop of continuous improvement. Plan a change against a measurable goal, \
                   Do it on a small scale, Check the results against the expectation, and \
                   Act: standardize what worked or adjust and run the loop again. The power \
                   is in the repetition, not any single pass.",
            keywords: &["pdca", "plan do check act", "deming cycle", "continuous improvement cycle"],
            follow_ups: &[
                "How long should one PDCA cycle take?",
                "How does PDCA relate to kaizen?",
                "What should I measure in the Check phase?",
            ],
        },
        Topic {
            id: "lean",
            title: "Lean Principles and Waste Reduction",
            body: "Lean focuses on delivering value while eliminating the classic wastes: \
                   overproduction, waiting, transport, over-processing, inventory, motion, \
                   and defects. Core practices include value-stream mapping to see the whole \
                   flow, 5S for workplace organization, and kaizen for small continuous \
                   improvements driven by the people doing the work.",
            keywords: &["lean", "waste reduction", "kaizen", "5s", "value stream", "muda"],
            follow_ups: &[
                "How do I run a value-stream mapping workshop?",
                "What are the 5S steps?",
                "Which waste should I attack first?",
            ],
        },
        Topic {
            id: "root_cause",
            title: "Root Cause Analysis",
            body: "Root cause analysis digs past symptoms to the condition that actually \
                   produced a problem. Start with a clear problem statement, then use the \
                   5 Whys to walk the causal chain, a fishbone diagram to organize candidate \
                   causes by category (material, machine, method, measurement, environment, \
                   people), and data to confirm or eliminate each candidate before acting.",
            keywords: &["root cause", "5 whys", "five whys", "cause and effect", "why did",
                "problem solving"],
            follow_ups: &[
                "How many whys are enough?",
                "How do I verify a suspected root cause with data?",
                "What if there are several root causes?",
            ],
        },
        Topic {
            id: "defect_reduction",
            title: "Reducing Defects Systematically",
            body: "A workable defect-reduction campaign runs in phases: collect defect data \
                   with check sheets for a couple of weeks to get a baseline; Pareto the \
                   categories and focus on the few causing most of the pain; run root cause \
                   analysis on those; implement fixes through PDCA with error-proofing \
                   (poka-yoke) where possible; then hold the gains with control charts and \
                   standard work.",
            keywords: &["defect", "reduce scrap", "rework", "error proofing",
                "poka-yoke", "quality issues"],
            follow_ups: &[
                "How do I design a good check sheet?",
                "What is poka-yoke with an example?",
                "How do I know the improvement stuck?",
            ],
        },
        Topic {
            id: "process_improvement",
            title: "Process Improvement",
            body: "Improving a process starts with making it visible: map the current state, \
                   measure where time and defects accumulate, and agree on what 'better' \
                   means. From there, pick the smallest change likely to move the metric, \
                   trial it through PDCA, and standardize what works. Tools like process \
                   maps, Pareto charts, and control charts keep the effort honest.",
            keywords: &["process improvement", "improve process", "optimize process",
                "process mapping", "workflow", "operational excellence"],
            follow_ups: &[
                "How do I map a process I don't fully understand?",
                "What metrics should a process improvement track?",
                "How do I get the team on board with changes?",
            ],
        },
        Topic {
            id: "customer_satisfaction",
            title: "Customer Satisfaction and Complaints",
            body: "Treat complaints as free quality data: log every one with enough detail \
                   to categorize it, Pareto the categories monthly, and route the biggest \
                   ones into root cause analysis. Close the loop with the customer once the \
                   fix lands. Tracking complaint rate and repeat-complaint rate shows \
                   whether the process, not just the individual cases, is improving.",
            keywords: &["customer satisfaction", "customer complaint", "complaints",
                "customer feedback", "service quality"],
            follow_ups: &[
                "How should I categorize customer complaints?",
                "What response time should we target for complaints?",
                "How do I measure satisfaction beyond surveys?",
            ],
        },
    ]
}
