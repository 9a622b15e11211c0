//! Wi-Fi二维码生成

use crate::error::Result;
use image::{ImageFormat, Luma};
use qrcode::{EcLevel, QrCode};
use std::io::Cursor;

/// 每个模块的像素尺寸
const MODULE_PIXELS: u32 = 10;

/// 构造Wi-Fi连接串：`WIFI:S:<SSID>;T:WPA;P:<密码>;;`
pub fn wifi_qr_payload(ssid: &str, password: &str) -> String {
    format!(
        "WIFI:S:{};T:WPA;P:{};;",
        escape_field(ssid),
        escape_field(password)
    )
}

// 连接串中的保留字符需要反斜杠转义
fn escape_field(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | ';' | ',' | ':' | '"') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// 生成Wi-Fi二维码PNG
pub fn generate_wifi_qrcode(ssid: &str, password: &str) -> Result<Vec<u8>> {
    let payload = wifi_qr_payload(ssid, password);
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)?;

    let image = code
        .render::<Luma<u8>>()
        .module_dimensions(MODULE_PIXELS, MODULE_PIXELS)
        .quiet_zone(true)
        .build();

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;

    log::info!("已生成Wi-Fi二维码，SSID: {}", ssid);
    Ok(bytes)
}
