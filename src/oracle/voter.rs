//! 三方 oracle 多数投票器
//!
//! 三个 oracle 并发作答，任一答案拿到至少两票即胜出。
//! 三票各异时采用固定槽位的兜底 oracle 的答案；
//! 全部失败则本轮无结果，由上层决定是否重试。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tracing::{info, warn};

use super::AnswerOracle;
use crate::models::StructuredQuestion;

/// 三票各异时采信的 oracle 槽位（第二位，即 Claude）
const FALLBACK_ORACLE_INDEX: usize = 1;

/// 胜出所需最低票数
const MAJORITY: usize = 2;

pub struct ConsensusVoter {
    oracles: Vec<Arc<dyn AnswerOracle>>,
    timeout: Duration,
}

impl ConsensusVoter {
    /// oracle 顺序即优先级顺序，兜底槽位按此顺序取
    pub fn new(oracles: Vec<Arc<dyn AnswerOracle>>, timeout: Duration) -> Self {
        Self { oracles, timeout }
    }

    /// 并发收集所有 oracle 的答案，超时按失败处理
    async fn collect_votes(&self, question: &StructuredQuestion) -> Vec<Option<u32>> {
        let calls = self.oracles.iter().map(|oracle| {
            let oracle = Arc::clone(oracle);
            async move {
                match tokio::time::timeout(self.timeout, oracle.answer(question)).await {
                    Ok(answer) => answer,
                    Err(_) => {
                        warn!("⏰ oracle [{}] 超时", oracle.name());
                        None
                    }
                }
            }
        });
        join_all(calls).await
    }

    /// 对一道题进行一轮投票
    ///
    /// 返回胜出的选项序号；所有 oracle 均失败时返回 None，
    /// 绝不臆造默认答案。
    pub async fn vote(&self, question: &StructuredQuestion) -> Option<u32> {
        let votes = self.collect_votes(question).await;

        for (oracle, vote) in self.oracles.iter().zip(&votes) {
            match vote {
                Some(v) => info!("🗳️ [{}] 投给选项 {}", oracle.name(), v),
                None => info!("🗳️ [{}] 弃权", oracle.name()),
            }
        }

        resolve(&votes)
    }
}

/// 从一组投票中裁决胜者
///
/// 按 oracle 优先级顺序扫描，第一个票数达到多数的答案胜出；
/// 无多数时采信兜底槽位的答案，该槽位弃权则本轮无结果
fn resolve(votes: &[Option<u32>]) -> Option<u32> {
    let mut tally: HashMap<u32, usize> = HashMap::new();
    for vote in votes.iter().flatten() {
        *tally.entry(*vote).or_insert(0) += 1;
    }

    for vote in votes.iter().flatten() {
        if tally[vote] >= MAJORITY {
            info!("✅ 选项 {} 获得 {} 票，达成多数", vote, tally[vote]);
            return Some(*vote);
        }
    }

    match votes.get(FALLBACK_ORACLE_INDEX).copied().flatten() {
        Some(v) => {
            info!("⚖️ 未达成多数，采信兜底 oracle 的答案 {}", v);
            Some(v)
        }
        None => {
            warn!("❌ 无多数票且兜底 oracle 弃权，本轮无结果");
            None
        }
    }
}
