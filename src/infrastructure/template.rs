//! 多尺度模板匹配
//!
//! 在屏幕截图里定位提交/下一题按钮。归一化互相关对亮度
//! 平移不敏感，模板在 0.8~1.2 倍之间缩放十档逐一尝试，
//! 取全局最高分。

use image::{imageops, DynamicImage, GrayImage};
use tracing::debug;

/// 一次模板匹配的结果
#[derive(Debug, Clone, Copy)]
pub struct TemplateMatch {
    /// 匹配区域中心（相对被搜索图像的坐标）
    pub center_x: i32,
    pub center_y: i32,
    /// 归一化互相关分值，范围 [-1, 1]
    pub score: f32,
}

const SCALE_MIN: f32 = 0.8;
const SCALE_MAX: f32 = 1.2;
const SCALE_STEPS: usize = 10;

/// 在 haystack 中搜索 template 的最佳匹配位置
///
/// 双方先转灰度。返回全尺度的最高分匹配；模板任何缩放档
/// 都放不进被搜索图像时返回 None。阈值判定留给调用方。
pub fn find_best_match(haystack: &DynamicImage, template: &DynamicImage) -> Option<TemplateMatch> {
    let haystack = haystack.to_luma8();
    let template = template.to_luma8();

    let mut best: Option<TemplateMatch> = None;

    for step in 0..SCALE_STEPS {
        let scale =
            SCALE_MIN + (SCALE_MAX - SCALE_MIN) * (step as f32) / ((SCALE_STEPS - 1) as f32);
        let tw = ((template.width() as f32) * scale).round() as u32;
        let th = ((template.height() as f32) * scale).round() as u32;
        if tw == 0 || th == 0 || tw > haystack.width() || th > haystack.height() {
            continue;
        }

        let scaled = imageops::resize(&template, tw, th, imageops::FilterType::Triangle);
        if let Some(m) = match_at_scale(&haystack, &scaled) {
            if best.map_or(true, |b| m.score > b.score) {
                debug!(
                    "🎯 尺度 {:.2} 处新的最佳匹配: 分值 {:.3} @ ({}, {})",
                    scale, m.score, m.center_x, m.center_y
                );
                best = Some(m);
            }
        }
    }

    best
}

/// 单一尺度下的滑窗归一化互相关
fn match_at_scale(haystack: &GrayImage, template: &GrayImage) -> Option<TemplateMatch> {
    let (hw, hh) = (haystack.width(), haystack.height());
    let (tw, th) = (template.width(), template.height());
    if tw > hw || th > hh {
        return None;
    }

    let t_pixels: Vec<f32> = template.pixels().map(|p| p.0[0] as f32).collect();
    let t_mean = t_pixels.iter().sum::<f32>() / (t_pixels.len() as f32);
    let t_centered: Vec<f32> = t_pixels.iter().map(|v| v - t_mean).collect();
    let t_norm = t_centered.iter().map(|v| v * v).sum::<f32>().sqrt();
    if t_norm == 0.0 {
        // 纯色模板无信息量
        return None;
    }

    let mut best_score = f32::NEG_INFINITY;
    let mut best_pos = (0u32, 0u32);

    for oy in 0..=(hh - th) {
        for ox in 0..=(hw - tw) {
            let mut w_sum = 0.0f32;
            for dy in 0..th {
                for dx in 0..tw {
                    w_sum += haystack.get_pixel(ox + dx, oy + dy).0[0] as f32;
                }
            }
            let w_mean = w_sum / (t_pixels.len() as f32);

            let mut cross = 0.0f32;
            let mut w_sq = 0.0f32;
            let mut idx = 0usize;
            for dy in 0..th {
                for dx in 0..tw {
                    let w = haystack.get_pixel(ox + dx, oy + dy).0[0] as f32 - w_mean;
                    cross += w * t_centered[idx];
                    w_sq += w * w;
                    idx += 1;
                }
            }

            let w_norm = w_sq.sqrt();
            if w_norm == 0.0 {
                continue;
            }
            let score = cross / (w_norm * t_norm);
            if score > best_score {
                best_score = score;
                best_pos = (ox, oy);
            }
        }
    }

    if best_score == f32::NEG_INFINITY {
        return None;
    }

    Some(TemplateMatch {
        center_x: (best_pos.0 + tw / 2) as i32,
        center_y: (best_pos.1 + th / 2) as i32,
        score: best_score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Luma, Rgba, RgbaImage};

    /// 在 (x, y) 处画一个 w x h 的亮块，其余为暗背景
    fn scene_with_block(x: u32, y: u32, w: u32, h: u32) -> DynamicImage {
        let mut img = RgbaImage::from_pixel(120, 90, Rgba([20, 20, 20, 255]));
        for dy in 0..h {
            for dx in 0..w {
                img.put_pixel(x + dx, y + dy, Rgba([230, 230, 230, 255]));
            }
        }
        DynamicImage::ImageRgba8(img)
    }

    /// 带边框的模板，避免纯色被拒
    fn block_template(w: u32, h: u32) -> DynamicImage {
        let mut img = GrayImage::from_pixel(w, h, Luma([230]));
        for x in 0..w {
            img.put_pixel(x, 0, Luma([20]));
            img.put_pixel(x, h - 1, Luma([20]));
        }
        for y in 0..h {
            img.put_pixel(0, y, Luma([20]));
            img.put_pixel(w - 1, y, Luma([20]));
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_finds_block_near_its_true_center() {
        let scene = scene_with_block(40, 30, 20, 12);
        let template = block_template(22, 14);

        let m = find_best_match(&scene, &template).unwrap();
        assert!(m.score > 0.5, "分值过低: {}", m.score);
        // 真实中心 (50, 36)，允许缩放档带来的少量偏移
        assert!((m.center_x - 50).abs() <= 4, "center_x = {}", m.center_x);
        assert!((m.center_y - 36).abs() <= 4, "center_y = {}", m.center_y);
    }

    #[test]
    fn test_absent_template_scores_low() {
        // 场景无任何亮块
        let scene = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            120,
            90,
            Rgba([20, 20, 20, 255]),
        ));
        let template = block_template(22, 14);

        // 纯色场景每个滑窗方差为零，全部跳过
        assert!(find_best_match(&scene, &template).is_none());
    }

    #[test]
    fn test_oversized_template_yields_none() {
        let scene = scene_with_block(10, 10, 5, 5);
        let template = block_template(400, 300);
        assert!(find_best_match(&scene, &template).is_none());
    }
}
