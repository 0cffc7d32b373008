//! tesseract OCR 引擎适配器
//!
//! 以子进程方式调用 tesseract，TSV 输出转为 RawFragment。
//! psm 6 把整幅图当作单个均匀文本块，line_num 因此全局单调。

use async_trait::async_trait;
use image::GrayImage;
use tokio::process::Command;
use tracing::debug;

use crate::error::{AppError, AppResult, OcrError};
use crate::ocr::extractor::RawFragment;

/// OCR 引擎能力
#[async_trait]
pub trait OcrProvider: Send + Sync {
    /// 识别一幅预处理后的灰度图，返回原始文本片段
    async fn recognize(&self, image: &GrayImage) -> AppResult<Vec<RawFragment>>;
}

/// 基于 tesseract 子进程的 OCR 实现
pub struct TesseractOcr;

impl TesseractOcr {
    pub fn new() -> Self {
        Self
    }
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OcrProvider for TesseractOcr {
    async fn recognize(&self, image: &GrayImage) -> AppResult<Vec<RawFragment>> {
        // tesseract 只认文件路径，经由临时 PNG 中转
        let tmp = tempfile::Builder::new()
            .prefix("quiz_ocr_")
            .suffix(".png")
            .tempfile()?;
        image.save(tmp.path())?;

        let output = Command::new("tesseract")
            .arg(tmp.path())
            .arg("stdout")
            .args(["--psm", "6", "--oem", "3", "tsv"])
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AppError::Ocr(OcrError::EngineFailed {
                source: format!("tesseract 退出码 {:?}: {}", output.status.code(), stderr).into(),
            }));
        }

        let tsv = String::from_utf8_lossy(&output.stdout);
        let fragments = parse_tsv(&tsv)?;
        debug!("🔍 tesseract 识别出 {} 个片段", fragments.len());
        Ok(fragments)
    }
}

/// 解析 tesseract 的 TSV 输出
///
/// 列顺序固定：level page_num block_num par_num line_num word_num
/// left top width height conf text。只保留单词级（level 5）行。
fn parse_tsv(tsv: &str) -> AppResult<Vec<RawFragment>> {
    let mut fragments = Vec::new();

    for line in tsv.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let cols: Vec<&str> = line.split('\t').collect();
        if cols.len() < 12 {
            return Err(AppError::Ocr(OcrError::TsvParseFailed {
                line: line.to_string(),
            }));
        }

        let level: u32 = cols[0].parse().map_err(|_| {
            AppError::Ocr(OcrError::TsvParseFailed {
                line: line.to_string(),
            })
        })?;
        if level != 5 {
            continue;
        }

        let parse_i32 = |idx: usize| -> AppResult<i32> {
            cols[idx].parse().map_err(|_| {
                AppError::Ocr(OcrError::TsvParseFailed {
                    line: line.to_string(),
                })
            })
        };

        fragments.push(RawFragment {
            line_num: parse_i32(4)?,
            left: parse_i32(6)?,
            top: parse_i32(7)?,
            width: parse_i32(8)?,
            height: parse_i32(9)?,
            conf: cols[10].to_string(),
            // 文本本身含制表符时会被切开，拼回去
            text: cols[11..].join("\t"),
        });
    }

    Ok(fragments)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext";

    #[test]
    fn test_parse_tsv_keeps_word_level_rows() {
        let tsv = format!(
            "{}\n\
             1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t\n\
             4\t1\t1\t1\t1\t0\t10\t10\t200\t24\t-1\t\n\
             5\t1\t1\t1\t1\t1\t10\t10\t60\t24\t91.5\tWhat\n\
             5\t1\t1\t1\t1\t2\t80\t10\t40\t24\t88.2\tis\n",
            HEADER
        );
        let fragments = parse_tsv(&tsv).unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].text, "What");
        assert_eq!(fragments[0].line_num, 1);
        assert_eq!(fragments[0].left, 10);
        assert_eq!(fragments[1].conf, "88.2");
    }

    #[test]
    fn test_parse_tsv_rejects_malformed_row() {
        let tsv = format!("{}\n5\t1\t1\n", HEADER);
        assert!(parse_tsv(&tsv).is_err());
    }

    #[test]
    fn test_parse_tsv_empty_body() {
        let fragments = parse_tsv(&format!("{}\n", HEADER)).unwrap();
        assert!(fragments.is_empty());
    }
}
