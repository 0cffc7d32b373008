//! 问答缓存
//!
//! 同一题干重复出现时跳过投票直接复用答案。
//! SQLite 单表，题干为主键，count 记录命中次数。

use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use crate::error::{AppError, AppResult, StoreError};

pub struct QaStore {
    conn: Connection,
}

impl QaStore {
    /// 打开（必要时创建）缓存数据库
    pub fn open(path: &str) -> AppResult<Self> {
        let conn = Connection::open(path).map_err(|e| {
            AppError::Store(StoreError::OpenFailed {
                path: path.to_string(),
                source: Box::new(e),
            })
        })?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS qa_pairs (
                question TEXT PRIMARY KEY,
                answer   INTEGER NOT NULL,
                count    INTEGER NOT NULL DEFAULT 1
            )",
            [],
        )?;

        let store = Self { conn };
        info!("💾 问答缓存已就绪: {}（已收录 {} 题）", path, store.len()?);
        Ok(store)
    }

    /// 查询题干对应的缓存答案，返回 (answer, count)
    pub fn lookup(&self, question: &str) -> AppResult<Option<(u32, u32)>> {
        let row = self
            .conn
            .query_row(
                "SELECT answer, count FROM qa_pairs WHERE question = ?1",
                params![question],
                |row| Ok((row.get::<_, u32>(0)?, row.get::<_, u32>(1)?)),
            )
            .optional()?;

        if let Some((answer, count)) = row {
            debug!("💾 缓存命中: 答案 {}（已出现 {} 次）", answer, count);
        }
        Ok(row)
    }

    /// 写入或更新一条问答对
    ///
    /// 已存在时覆盖答案并把 count 加一。同一题反复出现但
    /// 答案不同说明早先判错了，以最新为准。
    pub fn upsert(&self, question: &str, answer: u32) -> AppResult<()> {
        self.conn.execute(
            "INSERT INTO qa_pairs (question, answer, count) VALUES (?1, ?2, 1)
             ON CONFLICT(question) DO UPDATE SET
                 answer = excluded.answer,
                 count = count + 1",
            params![question, answer],
        )?;
        Ok(())
    }

    /// 缓存中的题目总数
    pub fn len(&self) -> AppResult<u32> {
        let n = self
            .conn
            .query_row("SELECT COUNT(*) FROM qa_pairs", [], |row| row.get(0))?;
        Ok(n)
    }

    pub fn is_empty(&self) -> AppResult<bool> {
        Ok(self.len()? == 0)
    }
}
