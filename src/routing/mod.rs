use crate::kb::types::KbUnit;
use crate::search::{normalize, ScoredCandidate};

/// Chunk notes longer than this are cut at a char boundary before they
/// go into the fallback prompt.
const MAX_NOTE_LEN: usize = 300;

/// Heading the fallback answer must carry; appended when the model
/// leaves it out.
const SOURCES_HEADING: &str = "Zdroje:";

/// Thresholds and trigger phrases of the decision policy.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Best-candidate score that earns a direct answer (entries only).
    pub direct_threshold: u32,
    /// Best-candidate score that earns a link for navigational queries.
    pub link_threshold: u32,
    /// How many candidates are packaged as fallback grounding.
    pub context_limit: usize,
    /// Normalized phrases marking a "where do I find / link" intent.
    pub link_triggers: Vec<String>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            direct_threshold: 3,
            link_threshold: 1,
            context_limit: 4,
            link_triggers: ["kde najdu", "kde je", "kde sehnat", "kde", "odkaz", "link"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// One grounding line packaged for the fallback prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextLine {
    pub label: String,
    pub note: String,
    pub url: String,
}

/// Grounding material handed to the generative fallback. Owns both the
/// prompt rendering and the derived source list, so the text the model
/// sees and the URLs we cite can never drift apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FallbackContext {
    pub lines: Vec<ContextLine>,
    pub site: Option<String>,
}

impl FallbackContext {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The context block as it appears in the fallback prompt.
    pub fn prompt_text(&self) -> String {
        if self.lines.is_empty() {
            return match &self.site {
                Some(site) => format!("- Oficiální web: {}", site),
                None => "- (žádné podklady)".to_string(),
            };
        }
        self.lines
            .iter()
            .map(|l| {
                format!(
                    "- {}\n  Odpověď/poznámka: {}\n  Odkaz: {}",
                    l.label, l.note, l.url
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Source URLs in prompt order, deduplicated. For an empty context
    /// this is the official site, when known.
    pub fn source_urls(&self) -> Vec<String> {
        if self.lines.is_empty() {
            return self.site.iter().cloned().collect();
        }
        let mut seen = std::collections::HashSet::new();
        self.lines
            .iter()
            .map(|l| l.url.clone())
            .filter(|u| seen.insert(u.clone()))
            .collect()
    }

    /// The single most relevant link to offer in degraded replies.
    pub fn best_url(&self) -> Option<&str> {
        self.lines
            .first()
            .map(|l| l.url.as_str())
            .or(self.site.as_deref())
    }
}

/// What the service should do with one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingDecision {
    /// Exact KB hit: answer text plus its official link.
    DirectAnswer { answer: String, url: String },
    /// Navigational query: best-effort link to the matched page.
    LinkAnswer { title: String, url: String },
    /// Inconclusive: delegate to the generative fallback with grounding.
    Fallback {
        question: String,
        context: FallbackContext,
    },
}

/// The tiered decision policy. Stateless; same inputs always produce the
/// same decision.
#[derive(Debug, Clone, Default)]
pub struct Router {
    config: RouterConfig,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        Self { config }
    }

    /// Evaluate the policy top to bottom, first match wins:
    /// 1. entry with score ≥ direct_threshold → direct answer,
    /// 2. navigational phrasing with score ≥ link_threshold → link,
    /// 3. otherwise delegate with packaged context.
    pub fn route(
        &self,
        query: &str,
        candidates: &[ScoredCandidate],
        site: Option<&str>,
    ) -> RoutingDecision {
        let query_norm = normalize(query);

        if let Some(best) = candidates.first() {
            if best.score >= self.config.direct_threshold {
                if let Some(entry) = best.unit.as_entry() {
                    return RoutingDecision::DirectAnswer {
                        answer: entry.answer.clone(),
                        url: entry.url.clone(),
                    };
                }
            }

            if best.score >= self.config.link_threshold && self.is_where_question(&query_norm) {
                return RoutingDecision::LinkAnswer {
                    title: best.unit.label().to_string(),
                    url: best.unit.url().to_string(),
                };
            }
        }

        RoutingDecision::Fallback {
            question: query.trim().to_string(),
            context: self.package_context(candidates, site),
        }
    }

    fn is_where_question(&self, query_norm: &str) -> bool {
        self.config
            .link_triggers
            .iter()
            .any(|t| query_norm.contains(t.as_str()))
    }

    /// Package the top candidates as grounding lines for the fallback.
    fn package_context(
        &self,
        candidates: &[ScoredCandidate],
        site: Option<&str>,
    ) -> FallbackContext {
        let lines = candidates
            .iter()
            .take(self.config.context_limit)
            .map(|c| match &c.unit {
                KbUnit::Entry(e) => ContextLine {
                    label: e.title.clone(),
                    note: e.answer.clone(),
                    url: e.url.clone(),
                },
                KbUnit::Chunk(ch) => ContextLine {
                    label: c.unit.label().to_string(),
                    note: truncate_note(&ch.text),
                    url: ch.url.clone(),
                },
            })
            .collect();

        FallbackContext {
            lines,
            site: site.map(|s| s.to_string()),
        }
    }
}

/// Append a deterministic sources section when the fallback answer lacks
/// one, built from the same context the model was grounded in.
pub fn ensure_sources(answer: &str, context: &FallbackContext) -> String {
    if answer.to_lowercase().contains("zdroje") {
        return answer.to_string();
    }

    let urls = context.source_urls();
    if urls.is_empty() {
        return answer.to_string();
    }

    let mut out = answer.trim_end().to_string();
    out.push_str("\n\n");
    out.push_str(SOURCES_HEADING);
    for url in urls {
        out.push_str("\n- ");
        out.push_str(&url);
    }
    out
}

fn truncate_note(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.chars().count() <= MAX_NOTE_LEN {
        return trimmed.to_string();
    }
    let cut: String = trimmed.chars().take(MAX_NOTE_LEN).collect();
    format!("{}…", cut.trim_end())
}
