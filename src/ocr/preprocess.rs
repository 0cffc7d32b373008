//! 图像预处理
//!
//! 灰度 → 对比度增强 → 二值化，和识别前的标准处理保持一致。
//! 不同的对比度/阈值组合对 OCR 漏字有显著影响，
//! 锚点缺失时会换一组参数重新识别。

use image::{DynamicImage, GrayImage, Luma};

/// 一组预处理参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OcrSettings {
    /// 对比度增强系数
    pub contrast_factor: f32,
    /// 二值化阈值（0-255）
    pub threshold: u8,
}

impl OcrSettings {
    pub fn new(contrast_factor: f32, threshold: u8) -> Self {
        Self {
            contrast_factor,
            threshold,
        }
    }
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self::new(3.0, 130)
    }
}

/// 按给定参数预处理图像
pub fn preprocess_image(image: &DynamicImage, settings: OcrSettings) -> GrayImage {
    let gray = image.to_luma8();
    let enhanced = enhance_contrast(&gray, settings.contrast_factor);
    binarize(&enhanced, settings.threshold)
}

/// 以 128 为中点做线性对比度增强
fn enhance_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        let v = pixel.0[0] as f32;
        let stretched = (v - 128.0) * factor + 128.0;
        pixel.0[0] = stretched.clamp(0.0, 255.0) as u8;
    }
    out
}

/// 二值化：低于阈值置 0，否则置 255
fn binarize(gray: &GrayImage, threshold: u8) -> GrayImage {
    let mut out = gray.clone();
    for pixel in out.pixels_mut() {
        pixel.0[0] = if pixel.0[0] < threshold { 0 } else { 255 };
    }
    out
}

/// 构造纯色测试图像
#[cfg(test)]
fn uniform(width: u32, height: u32, value: u8) -> GrayImage {
    GrayImage::from_pixel(width, height, Luma([value]))
}
