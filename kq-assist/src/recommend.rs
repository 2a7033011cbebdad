//! Quality-tool recommendations for tool-seeking queries.
//!
//! A static catalog of quality-management tools scored against the query:
//! direct keyword hits weigh more than broader scenario words, and the
//! best-scoring tools come back with enough context (complexity, lead
//! time, benefits) to act on.

/// One recommendable quality-management tool.
#[derive(Debug, Clone)]
pub struct QualityTool {
    /// Stable tool identifier.
    pub id: &'static str,
    /// Human-readable name.
    pub name: &'static str,
    /// Catalog category, e.g. "7QC" or "Process Improvement".
    pub category: &'static str,
    /// What the tool is and does.
    pub description: &'static str,
    /// Direct keywords; each hit scores 2.0. Multi-word keywords are
    /// matched as phrases.
    pub keywords: &'static [&'static str],
    /// Broader scenario words the tool applies to; each hit scores 1.0.
    pub scenarios: &'static [&'static str],
    /// Rough implementation complexity: "Low", "Medium", or "High".
    pub complexity: &'static str,
    /// Typical time to put the tool in place.
    pub lead_time: &'static str,
    /// What adopting the tool buys.
    pub benefits: &'static [&'static str],
}

/// A recommended tool with its relevance score.
#[derive(Debug, Clone, Copy)]
pub struct ToolRecommendation<'a> {
    /// The recommended tool.
    pub tool: &'a QualityTool,
    /// Keyword/scenario relevance score; higher is better.
    pub score: f32,
}

/// Phrases that mark a query as asking for a tool or method suggestion.
const TOOL_SEEKING: &[&str] =
    &["tool", "recommend", "suggest", "help with", "how to", "what should", "which method"];

/// The static tool catalog with relevance scoring.
#[derive(Debug)]
pub struct ToolRecommender {
    tools: Vec<QualityTool>,
}

impl Default for ToolRecommender {
    fn default() -> Self {
        Self { tools: builtin_tools() }
    }
}

impl ToolRecommender {
    /// The recommender with the built-in tool catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// All tools, in catalog order.
    pub fn tools(&self) -> &[QualityTool] {
        &self.tools
    }

    /// Whether the query is asking for a tool or method suggestion.
    pub fn seeks_tool(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        TOOL_SEEKING.iter().any(|phrase| query.contains(phrase))
    }

    /// Score the catalog against the query and return the best tools.
    ///
    /// Keyword hits score 2.0, scenario hits 1.0; tools with no hits are
    /// excluded. Ties order by tool name so results are deterministic.
    pub fn recommend(&self, query: &str, top_k: usize) -> Vec<ToolRecommendation<'_>> {
        let query = query.to_lowercase();
        let mut scored: Vec<ToolRecommendation<'_>> = self
            .tools
            .iter()
            .map(|tool| {
                let keyword_hits = tool.keywords.iter().filter(|kw| query.contains(*kw)).count();
                let scenario_hits = tool.scenarios.iter().filter(|sc| query.contains(*sc)).count();
                ToolRecommendation {
                    tool,
                    score: keyword_hits as f32 * 2.0 + scenario_hits as f32,
                }
            })
            .filter(|r| r.score > 0.0)
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.tool.name.cmp(b.tool.name))
        });
        scored.truncate(top_k);
        scored
    }
}

fn builtin_tools() -> Vec<QualityTool> {
    vec![
        QualityTool {
            id: "check_sheet",
            name: "Check Sheet (Data Collection Sheet)",
            category: "7QC",
            description: "Systematic data collection sheet for tracking defects, frequencies, \
                          or observations at the point of work.",
            keywords: &["check sheet", "tally", "data collection", "defects"],
            scenarios: &["collect", "gather", "track", "record", "monitor", "measure"],
            complexity: "Low",
            lead_time: "1-2 days",
            benefits: &["Standardized data collection", "Trend identification"],
        },
        QualityTool {
            id: "histogram",
            name: "Histogram",
            category: "7QC",
            description: "Bar chart of the frequency distribution of process data, showing \
                          centering, spread, and shape.",
            keywords: &["histogram"],
            scenarios: &["distribution", "variation", "spread", "capability"],
            complexity: "Low",
            lead_time: "1 day",
            benefits: &["Visual pattern recognition", "Process understanding"],
        },
        QualityTool {
            id: "pareto_chart",
            name: "Pareto Chart",
            category: "7QC",
            description: "Ranked bar chart that separates the vital few causes from the \
                          trivial many (the 80/20 rule).",
            keywords: &["pareto", "vital few", "80/20", "prioritize", "defect"],
            scenarios: &["problem", "issue", "failure"],
            complexity: "Low",
            lead_time: "1-2 days",
            benefits: &["Priority identification", "Focus on the vital few"],
        },
        QualityTool {
            id: "fishbone",
            name: "Cause & Effect Diagram (Fishbone/Ishikawa)",
            category: "7QC",
            description: "Structured diagram for organizing candidate root causes of a \
                          problem by category.",
            keywords: &["fishbone", "ishikawa", "cause and effect"],
            scenarios: &["root cause", "brainstorm", "problem", "error"],
            complexity: "Medium",
            lead_time: "2-3 days",
            benefits: &["Systematic cause identification", "Team engagement"],
        },
        QualityTool {
            id: "scatter_diagram",
            name: "Scatter Diagram",
            category: "7QC",
            description: "Plot of two variables against each other to test whether they are \
                          related.",
            keywords: &["scatter", "correlation"],
            scenarios: &["relationship", "variables", "association"],
            complexity: "Medium",
            lead_time: "1-2 days",
            benefits: &["Relationship identification", "Data-driven decisions"],
        },
        QualityTool {
            id: "control_chart",
            name: "Control Chart",
            category: "7QC",
            description: "Time-series chart with control limits for monitoring process \
                          stability and detecting special-cause variation.",
            keywords: &["control chart", "spc", "control limits"],
            scenarios: &["monitor", "stability", "consistency", "over time"],
            complexity: "High",
            lead_time: "1-2 weeks",
            benefits: &["Process stability", "Early warning of drift"],
        },
        QualityTool {
            id: "stratification",
            name: "Stratification",
            category: "7QC",
            description: "Splitting data into groups (machine, shift, material) to reveal \
                          patterns a combined view hides.",
            keywords: &["stratification", "stratify"],
            scenarios: &["segment", "groups", "pattern"],
            complexity: "Medium",
            lead_time: "2-3 days",
            benefits: &["Detailed insights", "Targeted actions"],
        },
        QualityTool {
            id: "five_whys",
            name: "5 Whys Analysis",
            category: "Problem Solving",
            description: "Iterative questioning that walks a causal chain from symptom to \
                          root cause.",
            keywords: &["5 whys", "five whys", "why analysis"],
            scenarios: &["root cause", "investigate", "reason", "error"],
            complexity: "Low",
            lead_time: "1 day",
            benefits: &["Simple methodology", "Quick results"],
        },
        QualityTool {
            id: "pdca",
            name: "PDCA Cycle (Plan-Do-Check-Act)",
            category: "Process Improvement",
            description: "The basic loop of continuous improvement: plan a change, trial it, \
                          check the results, standardize or adjust.",
            keywords: &["pdca", "plan do check act", "deming"],
            scenarios: &["continuous improvement", "improve", "cycle"],
            complexity: "Medium",
            lead_time: "Ongoing",
            benefits: &["Systematic approach", "Sustainable improvement"],
        },
        QualityTool {
            id: "poka_yoke",
            name: "Poka-Yoke (Error Proofing)",
            category: "Error Prevention",
            description: "Designing the process so errors are prevented or caught before \
                          they become defects.",
            keywords: &["poka-yoke", "error proofing", "mistake proofing", "fool proof"],
            scenarios: &["prevent", "avoid", "mistake", "error"],
            complexity: "Medium",
            lead_time: "1-2 weeks",
            benefits: &["Error reduction at the source", "Lower inspection load"],
        },
        QualityTool {
            id: "six_sigma",
            name: "Six Sigma DMAIC",
            category: "Process Improvement",
            description: "Data-driven methodology for eliminating defects through the \
                          Define-Measure-Analyze-Improve-Control phases.",
            keywords: &["six sigma", "dmaic"],
            scenarios: &["reduce", "variation", "statistical", "data driven"],
            complexity: "High",
            lead_time: "3-6 months",
            benefits: &["Significant improvements", "Standardized methodology"],
        },
    ]
}
