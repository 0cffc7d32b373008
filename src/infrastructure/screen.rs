//! 屏幕截取与鼠标指针
//!
//! xcap 负责截屏，enigo 负责指针。Enigo 句柄不是 Sync 的，
//! 包在 Mutex 里共享。

use std::sync::Mutex;

use enigo::{Button, Coordinate, Direction, Enigo, Mouse, Settings};
use image::{DynamicImage, RgbaImage};
use tracing::debug;
use xcap::Monitor;

use crate::error::{AppError, AppResult};

/// 屏幕截取能力
pub trait ScreenCapture: Send + Sync {
    /// 截取主显示器上的一块区域，region 为 (x, y, width, height) 绝对坐标
    fn capture_region(&self, region: (i32, i32, u32, u32)) -> AppResult<DynamicImage>;
}

/// 指针控制能力
pub trait PointerControl: Send + Sync {
    /// 移动到绝对坐标并左键单击
    fn click(&self, x: i32, y: i32) -> AppResult<()>;
}

/// 基于 xcap 的主显示器截取
pub struct XcapScreen;

impl XcapScreen {
    pub fn new() -> Self {
        Self
    }

    fn primary_monitor() -> AppResult<Monitor> {
        let monitors = Monitor::all().map_err(AppError::capture_failed)?;
        monitors
            .into_iter()
            .find(|m| m.is_primary())
            .ok_or_else(|| AppError::Other("未找到主显示器".to_string()))
    }
}

impl Default for XcapScreen {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenCapture for XcapScreen {
    fn capture_region(&self, region: (i32, i32, u32, u32)) -> AppResult<DynamicImage> {
        let (x, y, width, height) = region;
        let monitor = Self::primary_monitor()?;
        let frame = monitor.capture_image().map_err(AppError::capture_failed)?;

        // 重新打包像素缓冲，避免依赖 xcap 内部 image 版本的类型同一性
        let (fw, fh) = (frame.width(), frame.height());
        let full = RgbaImage::from_raw(fw, fh, frame.into_raw())
            .ok_or_else(|| AppError::Other("截屏像素缓冲长度异常".to_string()))?;

        // 区域相对显示器原点裁剪，越界部分收缩到帧内
        let mx = monitor.x();
        let my = monitor.y();
        let cx = (x - mx).max(0) as u32;
        let cy = (y - my).max(0) as u32;
        if cx >= fw || cy >= fh {
            return Err(AppError::Other(format!(
                "截取区域 ({}, {}) 完全落在显示器帧外",
                x, y
            )));
        }
        let cw = width.min(fw - cx);
        let ch = height.min(fh - cy);

        debug!("📷 截取区域 ({}, {}) {}x{}", x, y, cw, ch);
        let cropped = image::imageops::crop_imm(&full, cx, cy, cw, ch).to_image();
        Ok(DynamicImage::ImageRgba8(cropped))
    }
}

/// 基于 enigo 的指针控制
pub struct EnigoPointer {
    enigo: Mutex<Enigo>,
}

impl EnigoPointer {
    pub fn new() -> AppResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(AppError::pointer_failed)?;
        Ok(Self {
            enigo: Mutex::new(enigo),
        })
    }
}

impl PointerControl for EnigoPointer {
    fn click(&self, x: i32, y: i32) -> AppResult<()> {
        let mut enigo = self
            .enigo
            .lock()
            .map_err(|_| AppError::Other("Enigo 锁中毒".to_string()))?;

        debug!("🖱️ 点击绝对坐标 ({}, {})", x, y);
        enigo
            .move_mouse(x, y, Coordinate::Abs)
            .map_err(AppError::pointer_failed)?;
        enigo
            .button(Button::Left, Direction::Click)
            .map_err(AppError::pointer_failed)?;
        Ok(())
    }
}
