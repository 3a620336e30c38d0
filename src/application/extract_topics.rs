use crate::config::Thresholds;
use crate::domain::entities::article::ArticleSeed;
use crate::domain::entities::topic::Topic;
use crate::domain::error::DomainError;
use crate::domain::ports::article_repository::ArticleRepository;
use crate::domain::ports::llm_port::LlmProvider;
use crate::domain::ports::market_data::MarketData;
use crate::domain::ports::topic_repository::TopicRepository;
use crate::domain::values::day::Day;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{info, warn};

/// Extra attempts after the first schema-invalid response.
const MAX_SCHEMA_RETRIES: u32 = 2;
/// Candidate sector names offered to the model, capped to keep the prompt
/// size predictable.
const CANDIDATE_CAP: usize = 300;

const SYSTEM_PROMPT: &str = "你是金融资讯分析助手。任务：从给定文章内容中抽取'股票板块/行业/概念'名称。\n\
要求：\n\
1) 只输出 JSON（不要 markdown）。\n\
2) 结果结构：{\"sectors\":[{\"name\":string,\"articleIndexes\":[int,...],\"reason\":string}...]}\n\
3) 如果提供了'候选行业板块清单'，name 必须严格从清单里选，且必须完全一致；同义词/别名请归并到最贴近的候选板块。\n\
4) 如果没有清单，则 name 使用中文常见叫法（如：'半导体''AI算力''军工''新能源车'），去重并合并同义词。\n\
5) articleIndexes 为提到该板块的文章编号（从 1 开始）。\n";

const STRICT_SUFFIX: &str =
    "\n之前的回复不是合法 JSON。只输出一个 JSON 对象，不要任何解释、markdown 或代码块。";

#[derive(Deserialize)]
struct LlmSectors {
    #[serde(default)]
    sectors: Vec<LlmSector>,
}

#[derive(Deserialize)]
struct LlmSector {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "articleIndexes")]
    article_indexes: Vec<i64>,
    #[serde(default)]
    reason: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct TopicsOutcome {
    pub generated: usize,
    /// Sectors the model returned that fell below the mention threshold or
    /// outside the candidate list.
    pub dropped: usize,
}

pub struct ExtractTopicsUseCase {
    articles: Arc<dyn ArticleRepository>,
    topics: Arc<dyn TopicRepository>,
    llm: Arc<dyn LlmProvider>,
    market: Arc<dyn MarketData>,
}

impl ExtractTopicsUseCase {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        topics: Arc<dyn TopicRepository>,
        llm: Arc<dyn LlmProvider>,
        market: Arc<dyn MarketData>,
    ) -> Self {
        Self {
            articles,
            topics,
            llm,
            market,
        }
    }

    pub async fn execute(&self, day: Day, t: &Thresholds) -> Result<TopicsOutcome, DomainError> {
        let seeds = self.articles.list_for_day(day, t.max_articles)?;
        if seeds.is_empty() {
            self.topics.replace_day(day, &[])?;
            return Ok(TopicsOutcome {
                generated: 0,
                dropped: 0,
            });
        }

        // Constrain the model to real industry-board names when we can get
        // them; an unreachable quote host must not block topic extraction.
        let allowed: Vec<String> = match self.market.industry_boards().await {
            Ok(boards) => boards.into_iter().map(|b| b.name).collect(),
            Err(e) => {
                warn!(error = %e, "industry board list unavailable, extracting unconstrained");
                Vec::new()
            }
        };

        let user = build_user_prompt(&seeds, &allowed, t.max_chars);
        let parsed = self.complete_validated(&user).await?;

        let mut dropped = 0;
        // BTreeMap keyed by sector name merges duplicate entries and gives a
        // stable order before the mention-count sort in the repository.
        let mut by_sector: BTreeMap<String, (BTreeSet<String>, String)> = BTreeMap::new();
        let allowed_set: BTreeSet<&str> = allowed.iter().map(|s| s.as_str()).collect();
        for sector in parsed.sectors {
            let name = sector.name.trim().to_string();
            if name.is_empty() {
                continue;
            }
            // Candidate-list constraint: drop, never substitute.
            if !allowed_set.is_empty() && !allowed_set.contains(name.as_str()) {
                dropped += 1;
                continue;
            }
            let entry = by_sector.entry(name).or_default();
            for idx in &sector.article_indexes {
                // 1-based; out-of-range indexes are ignored.
                if *idx >= 1 && (*idx as usize) <= seeds.len() {
                    entry.0.insert(seeds[*idx as usize - 1].id.clone());
                }
            }
            if entry.1.is_empty() {
                entry.1 = sector.reason.trim().to_string();
            }
        }

        let mut rows = Vec::new();
        for (sector, (article_ids, reason)) in by_sector {
            let mention_count = article_ids.len() as u32;
            if mention_count < t.min_mention {
                dropped += 1;
                continue;
            }
            rows.push(Topic::new(
                day,
                sector,
                mention_count,
                article_ids.into_iter().collect(),
                reason,
            ));
        }

        self.topics.replace_day(day, &rows)?;
        info!(day = %day, generated = rows.len(), dropped, "topics extracted");
        Ok(TopicsOutcome {
            generated: rows.len(),
            dropped,
        })
    }

    /// One completion plus bounded re-asks when the reply fails schema
    /// validation. Transient provider errors propagate unchanged.
    async fn complete_validated(&self, user: &str) -> Result<LlmSectors, DomainError> {
        let mut last_err = String::new();
        for attempt in 0..=MAX_SCHEMA_RETRIES {
            let system = if attempt == 0 {
                SYSTEM_PROMPT.to_string()
            } else {
                format!("{SYSTEM_PROMPT}{STRICT_SUFFIX}")
            };
            let raw = self.llm.complete(&system, user).await?;
            match serde_json::from_str::<LlmSectors>(strip_fences(&raw)) {
                Ok(parsed) => return Ok(parsed),
                Err(e) => {
                    warn!(attempt, error = %e, "LLM reply failed schema validation");
                    last_err = e.to_string();
                }
            }
        }
        Err(DomainError::MalformedLlmOutput(last_err))
    }
}

fn build_user_prompt(seeds: &[ArticleSeed], allowed: &[String], max_chars: usize) -> String {
    let mut parts = Vec::with_capacity(seeds.len());
    for (i, seed) in seeds.iter().enumerate() {
        let mut body: String = seed.digest.chars().take(max_chars).collect();
        if seed.digest.chars().count() > max_chars {
            body.push_str("\n...");
        }
        parts.push(format!(
            "[文章{}]\n标题: {}\n链接: {}\n正文: {}\n",
            i + 1,
            seed.title,
            seed.url,
            body
        ));
    }
    let joined = parts.join("\n---\n");

    let mut candidates: Vec<&str> = allowed.iter().map(|s| s.trim()).filter(|s| !s.is_empty()).collect();
    candidates.sort_unstable();
    candidates.dedup();
    candidates.truncate(CANDIDATE_CAP);

    let candidate_block = if candidates.is_empty() {
        String::new()
    } else {
        let lines: Vec<String> = candidates
            .iter()
            .enumerate()
            .map(|(i, name)| format!("{}. {name}", i + 1))
            .collect();
        format!(
            "\n候选行业板块清单（只能从此清单中选择，名称必须完全一致；无法匹配则忽略，不要自造板块名）：\n{}\n",
            lines.join("\n")
        )
    };

    format!("下面是文章列表，请抽取板块：\n{candidate_block}\n{joined}")
}

/// Models sometimes wrap the JSON in a markdown fence despite instructions;
/// stripping the fence is the only tolerated deviation.
fn strip_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_fences() {
        assert_eq!(strip_fences("{\"a\":1}"), "{\"a\":1}");
        assert_eq!(strip_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn test_parses_sector_schema() {
        let raw = r#"{"sectors":[{"name":"半导体","articleIndexes":[1,2],"reason":"多篇提及"}]}"#;
        let parsed: LlmSectors = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.sectors.len(), 1);
        assert_eq!(parsed.sectors[0].article_indexes, vec![1, 2]);
    }
}
