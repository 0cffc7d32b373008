use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// OCR 相关错误
    Ocr(OcrError),
    /// 版面重建错误
    Layout(LayoutError),
    /// 共识投票错误
    Vote(VoteError),
    /// 点击分发错误
    Dispatch(DispatchError),
    /// 本地缓存错误
    Store(StoreError),
    /// 配置错误
    Config(ConfigError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Ocr(e) => write!(f, "OCR错误: {}", e),
            AppError::Layout(e) => write!(f, "版面错误: {}", e),
            AppError::Vote(e) => write!(f, "投票错误: {}", e),
            AppError::Dispatch(e) => write!(f, "分发错误: {}", e),
            AppError::Store(e) => write!(f, "缓存错误: {}", e),
            AppError::Config(e) => write!(f, "配置错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Ocr(e) => Some(e),
            AppError::Layout(e) => Some(e),
            AppError::Vote(e) => Some(e),
            AppError::Dispatch(e) => Some(e),
            AppError::Store(e) => Some(e),
            AppError::Config(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// OCR 相关错误
#[derive(Debug)]
pub enum OcrError {
    /// tesseract 进程执行失败
    EngineFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// TSV 输出解析失败
    TsvParseFailed {
        line: String,
    },
    /// 截取区域没有识别出任何有效单词
    EmptyCapture,
}

impl fmt::Display for OcrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OcrError::EngineFailed { source } => {
                write!(f, "OCR引擎执行失败: {}", source)
            }
            OcrError::TsvParseFailed { line } => {
                write!(f, "TSV行解析失败: {}", line)
            }
            OcrError::EmptyCapture => write!(f, "截取区域未识别出任何单词"),
        }
    }
}

impl std::error::Error for OcrError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OcrError::EngineFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 版面重建错误
#[derive(Debug)]
pub enum LayoutError {
    /// 行数不足，无法从版面上区分题干和选项
    AmbiguousLayout {
        total_lines: usize,
        expected_answers: usize,
    },
    /// 修复后仍有选项缺少屏幕锚点
    UnresolvedAnchor {
        positions: Vec<u32>,
    },
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::AmbiguousLayout {
                total_lines,
                expected_answers,
            } => {
                write!(
                    f,
                    "版面歧义: 仅 {} 行文本，不足以分离 {} 个选项",
                    total_lines, expected_answers
                )
            }
            LayoutError::UnresolvedAnchor { positions } => {
                write!(f, "选项 {:?} 缺少屏幕锚点", positions)
            }
        }
    }
}

impl std::error::Error for LayoutError {}

/// 共识投票错误
#[derive(Debug)]
pub enum VoteError {
    /// 三方均失败或无多数且兜底 oracle 也失败
    NoDeterminableAnswer,
}

impl fmt::Display for VoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoteError::NoDeterminableAnswer => {
                write!(f, "无法确定答案（无多数票且兜底 oracle 失败）")
            }
        }
    }
}

impl std::error::Error for VoteError {}

/// 点击分发错误
#[derive(Debug)]
pub enum DispatchError {
    /// 投票结果索引在选项集中不存在
    AnswerIndexNotFound {
        index: u32,
    },
    /// 选中的选项没有锚点 tag
    MissingTag {
        index: u32,
    },
    /// 锚点 tag 在 OCR 映射中不存在
    TagNotInMapping {
        tag: u32,
    },
    /// 模板匹配未找到提交/下一题按钮
    SubmitButtonNotFound {
        best_score: f32,
        threshold: f32,
    },
    /// 模板图片加载失败
    TemplateLoadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 指针操作失败
    PointerFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 屏幕截取失败
    CaptureFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DispatchError::AnswerIndexNotFound { index } => {
                write!(f, "答案索引 {} 在选项集中不存在", index)
            }
            DispatchError::MissingTag { index } => {
                write!(f, "答案索引 {} 的选项缺少锚点 tag", index)
            }
            DispatchError::TagNotInMapping { tag } => {
                write!(f, "锚点 tag {} 在 OCR 映射中不存在", tag)
            }
            DispatchError::SubmitButtonNotFound {
                best_score,
                threshold,
            } => {
                write!(
                    f,
                    "未找到提交/下一题按钮 (最高相似度 {:.2} < 阈值 {:.2})",
                    best_score, threshold
                )
            }
            DispatchError::TemplateLoadFailed { path, source } => {
                write!(f, "模板图片加载失败 ({}): {}", path, source)
            }
            DispatchError::PointerFailed { source } => {
                write!(f, "指针操作失败: {}", source)
            }
            DispatchError::CaptureFailed { source } => {
                write!(f, "屏幕截取失败: {}", source)
            }
        }
    }
}

impl std::error::Error for DispatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DispatchError::TemplateLoadFailed { source, .. }
            | DispatchError::PointerFailed { source }
            | DispatchError::CaptureFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
            _ => None,
        }
    }
}

/// 本地缓存错误
#[derive(Debug)]
pub enum StoreError {
    /// 打开数据库失败
    OpenFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// SQL 执行失败
    QueryFailed {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::OpenFailed { path, source } => {
                write!(f, "打开缓存数据库失败 ({}): {}", path, source)
            }
            StoreError::QueryFailed { source } => {
                write!(f, "缓存查询失败: {}", source)
            }
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::OpenFailed { source, .. } | StoreError::QueryFailed { source } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 配置错误
#[derive(Debug)]
pub enum ConfigError {
    /// 环境变量解析失败
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EnvVarParseFailed {
                var_name,
                value,
                expected_type,
            } => {
                write!(
                    f,
                    "环境变量 {} 解析失败: 值 '{}' 无法转换为 {}",
                    var_name, value, expected_type
                )
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ========== 从常见错误类型转换 ==========
// 注意：不需要手动实现 From<AppError> for anyhow::Error，
// 因为 anyhow 已经为所有实现了 std::error::Error 的类型提供了自动实现

impl From<rusqlite::Error> for AppError {
    fn from(err: rusqlite::Error) -> Self {
        AppError::Store(StoreError::QueryFailed {
            source: Box::new(err),
        })
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Ocr(OcrError::EngineFailed {
            source: Box::new(err),
        })
    }
}

impl From<image::ImageError> for AppError {
    fn from(err: image::ImageError) -> Self {
        AppError::Dispatch(DispatchError::CaptureFailed {
            source: Box::new(err),
        })
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建锚点未解析错误
    pub fn unresolved_anchor(positions: Vec<u32>) -> Self {
        AppError::Layout(LayoutError::UnresolvedAnchor { positions })
    }

    /// 创建版面歧义错误
    pub fn ambiguous_layout(total_lines: usize, expected_answers: usize) -> Self {
        AppError::Layout(LayoutError::AmbiguousLayout {
            total_lines,
            expected_answers,
        })
    }

    /// 创建无法确定答案错误
    pub fn no_determinable_answer() -> Self {
        AppError::Vote(VoteError::NoDeterminableAnswer)
    }

    /// 创建指针操作失败错误
    pub fn pointer_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Dispatch(DispatchError::PointerFailed {
            source: Box::new(source),
        })
    }

    /// 创建屏幕截取失败错误
    pub fn capture_failed(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Dispatch(DispatchError::CaptureFailed {
            source: Box::new(source),
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
