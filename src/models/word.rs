//! OCR 单词数据模型
//!
//! 一次屏幕截取产生一批 WordToken，生命周期只覆盖本轮流水线

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OCR 识别出的单个单词（带屏幕位置）
///
/// tag 按阅读顺序（先按行，再从左到右）从 1 开始分配，
/// 创建后不可变，本轮结构构建完成即丢弃
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordToken {
    /// 阅读顺序编号（从 1 开始，单次提取内唯一且单调）
    pub tag: u32,
    pub text: String,
    /// 相对截取区域的像素坐标
    pub left: i32,
    pub top: i32,
    pub width: i32,
    pub height: i32,
    /// OCR 给出的视觉行号，同一行的单词共享同一个 line_num
    pub line_num: i32,
}

impl WordToken {
    /// 计算单词外接框的中心点（区域相对坐标）
    pub fn center(&self) -> (i32, i32) {
        (self.left + self.width / 2, self.top + self.height / 2)
    }
}

/// tag → WordToken 的有序映射
///
/// tag 本身按阅读顺序分配，因此 BTreeMap 的迭代顺序就是阅读顺序。
/// 生命周期与一次截屏周期一致。
pub type OcrMapping = BTreeMap<u32, WordToken>;
