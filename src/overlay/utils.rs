use anyhow::{Context, Result, anyhow};
use std::io::Cursor;
use std::path::Path;
use std::process::{Child, Command};

const ICON_PNG: &[u8] = include_bytes!("../../assets/sysmon-overlay.png");

/// Decoded embedded icon as tightly packed RGBA
struct RgbaIcon {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

fn decode_icon() -> Result<RgbaIcon> {
    let decoder = png::Decoder::new(Cursor::new(ICON_PNG));
    let mut reader = decoder.read_info()?;
    let mut buf = vec![
        0;
        reader
            .output_buffer_size()
            .context("PNG has no output buffer size")?
    ];
    let info = reader.next_frame(&mut buf)?;
    let pixels = &buf[..info.buffer_size()];

    let rgba = match info.color_type {
        png::ColorType::Rgba => pixels.to_vec(),
        png::ColorType::Rgb => pixels
            .chunks_exact(3)
            .flat_map(|chunk| [chunk[0], chunk[1], chunk[2], 0xFF])
            .collect(),
        other => {
            return Err(anyhow!(
                "Unsupported icon color type {:?} (expected RGB or RGBA)",
                other
            ));
        }
    };

    Ok(RgbaIcon {
        width: info.width,
        height: info.height,
        rgba,
    })
}

pub fn load_tray_icon_pixmap() -> Result<ksni::Icon> {
    let icon = decode_icon()?;
    // RGBA → ARGB for the StatusNotifierItem pixmap
    let argb = icon
        .rgba
        .chunks_exact(4)
        .flat_map(|chunk| [chunk[3], chunk[0], chunk[1], chunk[2]])
        .collect();

    Ok(ksni::Icon {
        width: icon.width as i32,
        height: icon.height as i32,
        data: argb,
    })
}

/// Window icon for the settings editor
pub fn load_window_icon() -> Result<egui::IconData> {
    let icon = decode_icon()?;
    Ok(egui::IconData {
        rgba: icon.rgba,
        width: icon.width,
        height: icon.height,
    })
}

/// Start the settings editor as a child of this executable
pub fn spawn_settings_editor(ipc_server_name: &str, store_path: &Path) -> Result<Child> {
    let exe_path = std::env::current_exe().context("Failed to resolve executable path")?;
    Command::new(exe_path)
        .arg("--settings")
        .arg("--ipc-server")
        .arg(ipc_server_name)
        .arg("--config")
        .arg(store_path)
        .spawn()
        .context("Failed to spawn settings editor")
}
