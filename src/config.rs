/// 程序配置文件
use crate::ocr::preprocess::OcrSettings;

#[derive(Clone, Debug)]
pub struct Config {
    /// 截取区域（绝对屏幕坐标）
    pub region_x: i32,
    pub region_y: i32,
    pub region_width: u32,
    pub region_height: u32,
    /// AI 版面解析失败时假定的选项数量
    pub default_expected_answers: usize,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    // --- 版面 LLM 配置（OpenAI 兼容端点） ---
    pub layout_api_key: String,
    pub layout_api_base_url: String,
    pub layout_model_name: String,
    // --- 三方 oracle 配置 ---
    pub openai_api_key: String,
    pub openai_api_base_url: String,
    pub openai_model_name: String,
    pub claude_api_key: String,
    pub claude_model_name: String,
    pub cohere_api_key: String,
    pub cohere_model_name: String,
    /// 单次 oracle 调用超时（秒）
    pub oracle_timeout_secs: u64,
    /// 投票失败后的重试次数
    pub max_vote_retries: usize,
    // --- 提交按钮模板匹配 ---
    pub submit_template_path: String,
    pub template_match_threshold: f32,
    // --- 问答缓存 ---
    pub qa_cache_path: String,
    // --- 循环等待 ---
    /// 等待新题目加载的随机延迟下限/上限（秒）
    pub wait_min_secs: f64,
    pub wait_max_secs: f64,
    /// 连续多少次文本未变化后结束会话
    pub max_same_text_repeats: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region_x: 0,
            region_y: 0,
            region_width: 1280,
            region_height: 720,
            default_expected_answers: 4,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
            layout_api_key: String::new(),
            layout_api_base_url: "https://api.openai.com/v1".to_string(),
            layout_model_name: "gpt-3.5-turbo".to_string(),
            openai_api_key: String::new(),
            openai_api_base_url: "https://api.openai.com/v1".to_string(),
            openai_model_name: "gpt-4o".to_string(),
            claude_api_key: String::new(),
            claude_model_name: "claude-3-7-sonnet-20250219".to_string(),
            cohere_api_key: String::new(),
            cohere_model_name: "command-r-plus-08-2024".to_string(),
            oracle_timeout_secs: 30,
            max_vote_retries: 3,
            submit_template_path: "submit_button.png".to_string(),
            template_match_threshold: 0.7,
            qa_cache_path: "qa_cache.db".to_string(),
            wait_min_secs: 7.0,
            wait_max_secs: 10.0,
            max_same_text_repeats: 3,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            region_x: std::env::var("REGION_X").ok().and_then(|v| v.parse().ok()).unwrap_or(default.region_x),
            region_y: std::env::var("REGION_Y").ok().and_then(|v| v.parse().ok()).unwrap_or(default.region_y),
            region_width: std::env::var("REGION_WIDTH").ok().and_then(|v| v.parse().ok()).unwrap_or(default.region_width),
            region_height: std::env::var("REGION_HEIGHT").ok().and_then(|v| v.parse().ok()).unwrap_or(default.region_height),
            default_expected_answers: std::env::var("DEFAULT_EXPECTED_ANSWERS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.default_expected_answers),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            layout_api_key: std::env::var("LAYOUT_API_KEY").unwrap_or(default.layout_api_key),
            layout_api_base_url: std::env::var("LAYOUT_API_BASE_URL").unwrap_or(default.layout_api_base_url),
            layout_model_name: std::env::var("LAYOUT_MODEL_NAME").unwrap_or(default.layout_model_name),
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or(default.openai_api_key),
            openai_api_base_url: std::env::var("OPENAI_API_BASE_URL").unwrap_or(default.openai_api_base_url),
            openai_model_name: std::env::var("OPENAI_MODEL_NAME").unwrap_or(default.openai_model_name),
            claude_api_key: std::env::var("CLAUDE_API_KEY").unwrap_or(default.claude_api_key),
            claude_model_name: std::env::var("CLAUDE_MODEL_NAME").unwrap_or(default.claude_model_name),
            cohere_api_key: std::env::var("COHERE_API_KEY").unwrap_or(default.cohere_api_key),
            cohere_model_name: std::env::var("COHERE_MODEL_NAME").unwrap_or(default.cohere_model_name),
            oracle_timeout_secs: std::env::var("ORACLE_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.oracle_timeout_secs),
            max_vote_retries: std::env::var("MAX_VOTE_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_vote_retries),
            submit_template_path: std::env::var("SUBMIT_TEMPLATE_PATH").unwrap_or(default.submit_template_path),
            template_match_threshold: std::env::var("TEMPLATE_MATCH_THRESHOLD").ok().and_then(|v| v.parse().ok()).unwrap_or(default.template_match_threshold),
            qa_cache_path: std::env::var("QA_CACHE_PATH").unwrap_or(default.qa_cache_path),
            wait_min_secs: std::env::var("WAIT_MIN_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.wait_min_secs),
            wait_max_secs: std::env::var("WAIT_MAX_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.wait_max_secs),
            max_same_text_repeats: std::env::var("MAX_SAME_TEXT_REPEATS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.max_same_text_repeats),
        }
        .normalized()
    }

    /// 收拢相互约束的字段：等待区间上限不得低于下限
    fn normalized(mut self) -> Self {
        if self.wait_max_secs < self.wait_min_secs {
            self.wait_max_secs = self.wait_min_secs;
        }
        self
    }

    /// OCR 预处理备选参数（锚点缺失时按序重试）
    ///
    /// 第一组为默认参数，与单独截取时使用的参数一致
    pub fn ocr_settings(&self) -> Vec<OcrSettings> {
        vec![
            OcrSettings::new(3.0, 130),
            OcrSettings::new(4.0, 120),
            OcrSettings::new(2.5, 140),
        ]
    }

    /// 截取区域 (x, y, width, height)
    pub fn region(&self) -> (i32, i32, u32, u32) {
        (
            self.region_x,
            self.region_y,
            self.region_width,
            self.region_height,
        )
    }
}
