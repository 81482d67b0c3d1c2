use crate::models::{CatalogKey, SearchResult};

const EXACT_PART_NUMBER: i64 = 1000;
const PART_NUMBER_CONTAINS: i64 = 800;
const CATALOG_NUMBER_CONTAINS: i64 = 400;
const POSITION_BONUS: i64 = 500;
const TITLE_CONTAINS: i64 = 100;
const BRAND_FIELD: i64 = 15;

/// 候选商品及其得分 (只在一次评分中存在)
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate<'a> {
    pub result: &'a SearchResult,
    pub score: i64,
    pub rank: usize,
}

/// 匹配策略的选择结果
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub candidate: MatchCandidate<'a>,
    /// 商品型号字段与目录编号完全一致
    pub exact: bool,
}

/// 加法评分器
#[derive(Debug, Clone)]
pub struct MatchScorer {
    brand: String,
}

impl MatchScorer {
    pub fn new(brand: impl Into<String>) -> Self {
        Self {
            brand: brand.into().to_lowercase(),
        }
    }

    /// 计算单个候选的得分, rank 为页内从 0 开始的位置
    pub fn score(&self, candidate: &SearchResult, key: &CatalogKey, rank: usize) -> i64 {
        let id = key.id.as_str();
        let mut score = 0;

        if candidate.part_number == id {
            score += EXACT_PART_NUMBER;
        } else if candidate.part_number.contains(id) {
            score += PART_NUMBER_CONTAINS;
        } else if candidate.catalog_numbers.iter().any(|n| n.contains(id)) {
            score += CATALOG_NUMBER_CONTAINS;
        }

        score += POSITION_BONUS / (rank as i64 + 1);

        if candidate.title.contains(&format!(" {}", id)) {
            score += TITLE_CONTAINS;
        }

        let brand_fields = [
            &candidate.label,
            &candidate.manufacturer,
            &candidate.publisher,
            &candidate.studio,
            &candidate.title,
        ];
        for field in brand_fields {
            if field.to_lowercase().contains(&self.brand) {
                score += BRAND_FIELD;
            }
        }

        score
    }

    /// 按结果顺序遍历, 只有严格更高的得分才替换 (同分保留先出现的)
    pub fn select_best<'a>(
        &self,
        candidates: &'a [SearchResult],
        key: &CatalogKey,
    ) -> Option<MatchCandidate<'a>> {
        let mut best: Option<MatchCandidate<'a>> = None;
        for (rank, result) in candidates.iter().enumerate() {
            let score = self.score(result, key, rank);
            let is_better = match &best {
                None => true,
                Some(current) => score > current.score,
            };
            if is_better {
                best = Some(MatchCandidate { result, score, rank });
            }
        }
        best
    }

    /// 型号字段完全一致且制造商含品牌词
    pub fn is_field_exact(&self, candidate: &SearchResult, key: &CatalogKey) -> bool {
        candidate.part_number == key.id && candidate.manufacturer.to_lowercase().contains(&self.brand)
    }
}

/// 从一页候选中挑选匹配结果的策略
pub trait MatchPolicy: Send + Sync {
    fn name(&self) -> &'static str;

    fn select<'a>(&self, candidates: &'a [SearchResult], key: &CatalogKey) -> Option<Selection<'a>>;
}

/// 评分取最高; 设置 min_score 时低于阈值的结果被拒绝
#[derive(Debug, Clone)]
pub struct ScoredBestOf {
    scorer: MatchScorer,
    min_score: Option<i64>,
}

impl ScoredBestOf {
    pub fn new(scorer: MatchScorer) -> Self {
        Self {
            scorer,
            min_score: None,
        }
    }

    pub fn with_min_score(scorer: MatchScorer, min_score: i64) -> Self {
        Self {
            scorer,
            min_score: Some(min_score),
        }
    }
}

impl MatchPolicy for ScoredBestOf {
    fn name(&self) -> &'static str {
        "scored"
    }

    fn select<'a>(&self, candidates: &'a [SearchResult], key: &CatalogKey) -> Option<Selection<'a>> {
        let best = self.scorer.select_best(candidates, key)?;
        if let Some(min_score) = self.min_score {
            if best.score < min_score {
                tracing::debug!(
                    "Best candidate {} for {} scored {} (< {}), rejected",
                    best.result.external_id, key.id, best.score, min_score
                );
                return None;
            }
        }
        let exact = self.scorer.is_field_exact(best.result, key);
        Some(Selection {
            candidate: best,
            exact,
        })
    }
}

/// 型号+制造商精确匹配, 否则退回第一个结果
#[derive(Debug, Clone)]
pub struct ExactFieldOrFallbackFirst {
    scorer: MatchScorer,
}

impl ExactFieldOrFallbackFirst {
    pub fn new(scorer: MatchScorer) -> Self {
        Self { scorer }
    }
}

impl MatchPolicy for ExactFieldOrFallbackFirst {
    fn name(&self) -> &'static str {
        "exact-or-first"
    }

    fn select<'a>(&self, candidates: &'a [SearchResult], key: &CatalogKey) -> Option<Selection<'a>> {
        if let Some((rank, result)) = candidates
            .iter()
            .enumerate()
            .find(|(_, result)| self.scorer.is_field_exact(result, key))
        {
            let score = self.scorer.score(result, key, rank);
            return Some(Selection {
                candidate: MatchCandidate { result, score, rank },
                exact: true,
            });
        }

        let result = candidates.first()?;
        Some(Selection {
            candidate: MatchCandidate {
                result,
                score: self.scorer.score(result, key, 0),
                rank: 0,
            },
            exact: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(external_id: &str, part_number: &str, manufacturer: &str, title: &str) -> SearchResult {
        SearchResult {
            external_id: external_id.to_string(),
            part_number: part_number.to_string(),
            manufacturer: manufacturer.to_string(),
            title: title.to_string(),
            ..Default::default()
        }
    }

    fn key() -> CatalogKey {
        CatalogKey::new("7140-1", "X-wing Fighter")
    }

    #[test]
    fn exact_part_number_with_brand() {
        let scorer = MatchScorer::new("LEGO");
        let candidate = result("A1", "7140", "LEGO Group", "X-wing");
        // 1000 + 500 + 15
        assert_eq!(scorer.score(&candidate, &key(), 0), 1515);
    }

    #[test]
    fn weights_are_additive_and_exclusive() {
        let scorer = MatchScorer::new("lego");

        let contains = result("A1", "LEGO-7140-X", "", "");
        assert_eq!(scorer.score(&contains, &key(), 4), 800 + 100);

        let mut catalog = result("A2", "", "", "");
        catalog.catalog_numbers = vec!["x".into(), "ref 7140".into(), "7140".into()];
        assert_eq!(scorer.score(&catalog, &key(), 1), 400 + 250);

        let mut branded = result("A3", "", "LEGO", "LEGO Star Wars 7140 X-wing");
        branded.label = "Lego".into();
        branded.publisher = "LEGO".into();
        branded.studio = "LEGO".into();
        assert_eq!(scorer.score(&branded, &key(), 0), 500 + 100 + 75);
    }

    #[test]
    fn scoring_is_deterministic_and_only_rank_moves() {
        let scorer = MatchScorer::new("LEGO");
        let a = result("A1", "7140", "LEGO", "LEGO 7140");
        let b = result("B1", "", "", "Something else");

        let first = [scorer.score(&a, &key(), 0), scorer.score(&b, &key(), 1)];
        let again = [scorer.score(&a, &key(), 0), scorer.score(&b, &key(), 1)];
        assert_eq!(first, again);

        // 交换顺序只改变位置加分
        let a_moved = scorer.score(&a, &key(), 1);
        let b_moved = scorer.score(&b, &key(), 0);
        assert_eq!(first[0] - a_moved, 500 - 250);
        assert_eq!(b_moved - first[1], 500 - 250);
    }

    #[test]
    fn select_best_keeps_earliest_on_tie() {
        let scorer = MatchScorer::new("LEGO");
        // first = 500, second = 400 + 250
        let first = result("first", "", "", "");
        let mut second = result("second", "", "", "");
        second.catalog_numbers = vec!["7140".into()];
        let candidates = vec![first, second];
        let best = scorer.select_best(&candidates, &key()).unwrap();
        assert_eq!(best.result.external_id, "second");

        // rank 33 与 34 的位置加分同为 14
        let mut tied: Vec<SearchResult> = (0..33)
            .map(|i| result(&format!("filler-{i}"), "", "", ""))
            .collect();
        tied.push(result("tie-a", "7140", "", ""));
        tied.push(result("tie-b", "7140", "", ""));
        assert_eq!(scorer.score(&tied[33], &key(), 33), scorer.score(&tied[34], &key(), 34));

        let best = scorer.select_best(&tied, &key()).unwrap();
        assert_eq!(best.result.external_id, "tie-a");
        assert_eq!(best.score, 1014);
    }

    #[test]
    fn exact_match_dominates_any_non_matching_candidate() {
        let scorer = MatchScorer::new("LEGO");
        let mut strong_decoy = result("decoy", "", "LEGO", "LEGO set 7140 lookalike");
        strong_decoy.label = "LEGO".into();
        strong_decoy.publisher = "LEGO".into();
        strong_decoy.studio = "LEGO".into();
        let exact = result("exact", "7140", "", "");

        let candidates = vec![strong_decoy, exact];
        let best = scorer.select_best(&candidates, &key()).unwrap();
        assert_eq!(best.result.external_id, "exact");
        assert!(best.score > 675);
    }

    #[test]
    fn select_best_returns_input_element_or_none() {
        let scorer = MatchScorer::new("LEGO");
        assert!(scorer.select_best(&[], &key()).is_none());

        let candidates = vec![result("a", "1", "", ""), result("b", "2", "", "")];
        let best = scorer.select_best(&candidates, &key()).unwrap();
        assert!(candidates.iter().any(|c| std::ptr::eq(c, best.result)));
    }

    #[test]
    fn thresholded_policy_rejects_weak_candidates() {
        let candidates = vec![result("weak", "", "", "")];
        let unthresholded = ScoredBestOf::new(MatchScorer::new("LEGO"));
        let thresholded = ScoredBestOf::with_min_score(MatchScorer::new("LEGO"), 1000);

        let picked = unthresholded.select(&candidates, &key()).unwrap();
        assert!(!picked.exact);
        assert!(thresholded.select(&candidates, &key()).is_none());

        let strong = vec![result("strong", "7140", "LEGO", "")];
        let picked = thresholded.select(&strong, &key()).unwrap();
        assert!(picked.exact);
    }

    #[test]
    fn scored_policy_exact_needs_brand_manufacturer() {
        let policy = ScoredBestOf::new(MatchScorer::new("LEGO"));
        let knockoff = vec![result("knockoff", "7140", "Mega Bloks", "")];
        let picked = policy.select(&knockoff, &key()).unwrap();
        assert_eq!(picked.candidate.result.external_id, "knockoff");
        assert!(!picked.exact);

        let genuine = vec![result("genuine", "7140", "LEGO Group", "")];
        assert!(policy.select(&genuine, &key()).unwrap().exact);
    }

    #[test]
    fn exact_field_policy_requires_brand_and_falls_back_to_first() {
        let policy = ExactFieldOrFallbackFirst::new(MatchScorer::new("LEGO"));
        let candidates = vec![
            result("first", "9999", "LEGO", ""),
            result("wrong-brand", "7140", "Mega Bloks", ""),
            result("match", "7140", "LEGO Group", ""),
        ];
        let picked = policy.select(&candidates, &key()).unwrap();
        assert!(picked.exact);
        assert_eq!(picked.candidate.result.external_id, "match");
        assert_eq!(picked.candidate.rank, 2);

        let no_match = vec![result("first", "1", "", ""), result("second", "2", "", "")];
        let picked = policy.select(&no_match, &key()).unwrap();
        assert!(!picked.exact);
        assert_eq!(picked.candidate.result.external_id, "first");

        assert!(policy.select(&[], &key()).is_none());
    }
}
