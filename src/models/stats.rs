use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UidInfo {
    pub model_name: String,
    #[serde(default)]
    pub scores: Vec<f64>,
}

impl UidInfo {
    /// Damped mean: the extra 1 in the denominator keeps miners with few scores low.
    pub fn mean_score(&self) -> f64 {
        self.scores.iter().sum::<f64>() / (self.scores.len() as f64 + 1.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UidInfoResponse {
    pub all_uid_info: HashMap<String, UidInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinerScore {
    pub uid: String,
    pub mean_score: f64,
}

impl UidInfoResponse {
    /// Number of miners serving each model.
    pub fn model_distribution(&self) -> BTreeMap<String, usize> {
        let mut distribution = BTreeMap::new();
        for info in self.all_uid_info.values() {
            *distribution.entry(info.model_name.clone()).or_insert(0) += 1;
        }
        distribution
    }

    /// Miners of `model_name` by mean score, best first. `None` when every score is zero.
    pub fn leaderboard(&self, model_name: &str) -> Option<Vec<MinerScore>> {
        let mut board: Vec<MinerScore> = self
            .all_uid_info
            .iter()
            .filter(|(_, info)| info.model_name == model_name)
            .map(|(uid, info)| MinerScore {
                uid: uid.clone(),
                mean_score: info.mean_score(),
            })
            .collect();

        if board.iter().map(|m| m.mean_score).sum::<f64>() == 0.0 {
            return None;
        }

        board.sort_by(|a, b| {
            b.mean_score
                .total_cmp(&a.mean_score)
                .then_with(|| a.uid.cmp(&b.uid))
        });
        Some(board)
    }
}
