//! Usable screen area queries
//!
//! The widget anchors itself to the primary monitor's work area: the RandR
//! primary CRTC rectangle clipped by EWMH `_NET_WORKAREA` (which excludes
//! panels). Each query opens a fresh connection so monitor reconfiguration
//! is picked up on the next layout.

use anyhow::{Context, Result, anyhow};
use tracing::debug;
use x11rb::connection::Connection;
use x11rb::protocol::randr::ConnectionExt as RandrExt;
use x11rb::protocol::xproto::{AtomEnum, ConnectionExt, Window};
use x11rb::rust_connection::RustConnection;

use crate::common::types::ScreenGeometry;

/// Source of the usable display area
pub trait ScreenSource {
    fn available_geometry(&self) -> Result<ScreenGeometry>;
}

/// Queries the X server (directly or through XWayland)
#[derive(Debug, Default)]
pub struct X11Screen;

impl ScreenSource for X11Screen {
    fn available_geometry(&self) -> Result<ScreenGeometry> {
        let (conn, screen_num) = x11rb::connect(None).context("Failed to connect to X11")?;
        let screen = conn
            .setup()
            .roots
            .get(screen_num)
            .ok_or_else(|| anyhow!("X11 screen {} not found", screen_num))?;
        let root = screen.root;
        let full = ScreenGeometry::from_origin_size(
            0,
            0,
            screen.width_in_pixels as u32,
            screen.height_in_pixels as u32,
        );

        let monitor = match primary_monitor(&conn, root) {
            Ok(Some(monitor)) => monitor,
            Ok(None) => full,
            Err(err) => {
                debug!(error = ?err, "RandR primary monitor unavailable, using root window");
                full
            }
        };

        let work_area = match current_work_area(&conn, root) {
            Ok(area) => area,
            Err(err) => {
                debug!(error = ?err, "_NET_WORKAREA unavailable");
                None
            }
        };

        let geometry = match work_area {
            Some(area) => intersect(monitor, area).unwrap_or(monitor),
            None => monitor,
        };
        debug!(?geometry, "Queried available screen geometry");
        Ok(geometry)
    }
}

/// Rectangle of the RandR primary output's CRTC, if one is configured
fn primary_monitor(conn: &RustConnection, root: Window) -> Result<Option<ScreenGeometry>> {
    let output = conn
        .randr_get_output_primary(root)
        .context("Failed to query RandR primary output")?
        .reply()
        .context("Failed to get RandR primary output reply")?
        .output;
    if output == x11rb::NONE {
        return Ok(None);
    }

    let crtc = conn
        .randr_get_output_info(output, x11rb::CURRENT_TIME)
        .context("Failed to query RandR output info")?
        .reply()
        .context("Failed to get RandR output info reply")?
        .crtc;
    if crtc == x11rb::NONE {
        return Ok(None);
    }

    let info = conn
        .randr_get_crtc_info(crtc, x11rb::CURRENT_TIME)
        .context("Failed to query RandR CRTC info")?
        .reply()
        .context("Failed to get RandR CRTC info reply")?;
    if info.width == 0 || info.height == 0 {
        return Ok(None);
    }

    Ok(Some(ScreenGeometry::from_origin_size(
        info.x as i32,
        info.y as i32,
        info.width as u32,
        info.height as u32,
    )))
}

/// `_NET_WORKAREA` entry for `_NET_CURRENT_DESKTOP`
fn current_work_area(conn: &RustConnection, root: Window) -> Result<Option<ScreenGeometry>> {
    let net_workarea = conn
        .intern_atom(false, b"_NET_WORKAREA")?
        .reply()
        .context("Failed to intern _NET_WORKAREA")?
        .atom;
    let net_current_desktop = conn
        .intern_atom(false, b"_NET_CURRENT_DESKTOP")?
        .reply()
        .context("Failed to intern _NET_CURRENT_DESKTOP")?
        .atom;

    let desktop = conn
        .get_property(false, root, net_current_desktop, AtomEnum::CARDINAL, 0, 1)?
        .reply()
        .context("Failed to get _NET_CURRENT_DESKTOP")?
        .value32()
        .and_then(|mut values| values.next())
        .unwrap_or(0);

    let reply = conn
        .get_property(false, root, net_workarea, AtomEnum::CARDINAL, 0, 1024)?
        .reply()
        .context("Failed to get _NET_WORKAREA")?;

    let values: Vec<u32> = match reply.value32() {
        Some(values) => values.collect(),
        None => return Ok(None),
    };
    Ok(work_area_entry(&values, desktop as usize))
}

/// Pick the (x, y, w, h) quadruple for `desktop`, falling back to the first
fn work_area_entry(values: &[u32], desktop: usize) -> Option<ScreenGeometry> {
    let entry = values
        .chunks_exact(4)
        .nth(desktop)
        .or_else(|| values.chunks_exact(4).next())?;
    Some(ScreenGeometry::from_origin_size(
        entry[0] as i32,
        entry[1] as i32,
        entry[2],
        entry[3],
    ))
}

fn intersect(a: ScreenGeometry, b: ScreenGeometry) -> Option<ScreenGeometry> {
    let clipped = ScreenGeometry {
        left: a.left.max(b.left),
        top: a.top.max(b.top),
        right: a.right.min(b.right),
        bottom: a.bottom.min(b.bottom),
    };
    (clipped.width() > 0 && clipped.height() > 0).then_some(clipped)
}
