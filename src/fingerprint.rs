// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Weak device fingerprinting.
//!
//! Environment signals are serialized into one JSON string and reduced with a
//! 32-bit rolling hash. None of this is collision-resistant or tamper-proof:
//! every signal can be spoofed, and the token is only a bucketing aid.

use crate::utils::pretty_table;
use anyhow::Result;
use chrono::{Local, NaiveDate, TimeZone};
use serde::Serialize;
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

pub const UNKNOWN: &str = "unknown";
pub const CANVAS_UNAVAILABLE: &str = "canvas-unavailable";
pub const WEBGL_UNAVAILABLE: &str = "webgl-unavailable";
pub const AUDIO_UNAVAILABLE: &str = "audio-unavailable";

/// How long to wait for the audio probe to deliver its buffer.
pub const AUDIO_TIMEOUT: Duration = Duration::from_secs(5);

const AUDIO_SAMPLES: usize = 30;
const BANNER: &str = "SmallBiz BookKeeping Pro 🔐";

/// `h = h * 31 + unit` over UTF-16 code units with 32-bit wrap-around, then
/// the absolute value in base 36.
pub fn hash_string(s: &str) -> String {
    let mut hash: i32 = 0;
    for unit in s.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(unit as i32);
    }
    to_base36((hash as i64).unsigned_abs())
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut buf = Vec::new();
    while n > 0 {
        buf.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    buf.reverse();
    String::from_utf8_lossy(&buf).into_owned()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Screen {
    pub width: u32,
    pub height: u32,
    pub color_depth: u32,
}

/// Plain environment readings; `None` means the signal is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    pub user_agent: Option<String>,
    pub language: Option<String>,
    pub languages: Vec<String>,
    pub platform: Option<String>,
    pub screen: Option<Screen>,
    pub timezone: Option<String>,
    /// Minutes to add to local time to reach UTC.
    pub timezone_offset: i32,
    pub hardware_concurrency: u32,
    pub device_memory: u32,
}

pub trait SignalSource {
    fn environment(&self) -> Environment;

    /// Output of rendering a fixed banner.
    fn canvas(&self) -> Option<String>;

    /// `(renderer, vendor)` of the rendering hardware.
    fn renderer(&self) -> Option<(String, String)>;

    /// Starts audio sampling. The buffer arrives later on the receiver.
    fn audio(&self) -> Option<Receiver<Vec<f32>>>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Components {
    user_agent: String,
    language: String,
    languages: String,
    platform: String,
    screen_resolution: String,
    timezone: String,
    timezone_offset: i32,
    hardware_concurrency: u32,
    device_memory: u32,
    canvas_fingerprint: String,
    webgl_fingerprint: String,
    audio_fingerprint: String,
}

impl Components {
    fn collect(source: &dyn SignalSource) -> Self {
        let env = source.environment();
        let or_unknown = |v: Option<String>| v.unwrap_or_else(|| UNKNOWN.to_string());
        Components {
            user_agent: or_unknown(env.user_agent),
            language: or_unknown(env.language),
            languages: env.languages.join(","),
            platform: or_unknown(env.platform),
            screen_resolution: env
                .screen
                .map(|s| format!("{}x{}x{}", s.width, s.height, s.color_depth))
                .unwrap_or_else(|| UNKNOWN.to_string()),
            timezone: or_unknown(env.timezone),
            timezone_offset: env.timezone_offset,
            hardware_concurrency: env.hardware_concurrency,
            device_memory: env.device_memory,
            canvas_fingerprint: source
                .canvas()
                .map(|c| hash_string(&c))
                .unwrap_or_else(|| CANVAS_UNAVAILABLE.to_string()),
            webgl_fingerprint: source
                .renderer()
                .map(|(r, v)| hash_string(&format!("{}-{}", r, v)))
                .unwrap_or_else(|| WEBGL_UNAVAILABLE.to_string()),
            audio_fingerprint: audio_fingerprint(source, AUDIO_TIMEOUT),
        }
    }
}

fn audio_fingerprint(source: &dyn SignalSource, timeout: Duration) -> String {
    let Some(rx) = source.audio() else {
        return AUDIO_UNAVAILABLE.to_string();
    };
    match rx.recv_timeout(timeout) {
        Ok(buf) => {
            let joined = buf
                .iter()
                .take(AUDIO_SAMPLES)
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(",");
            hash_string(&joined)
        }
        Err(err) => {
            warn!(%err, "audio probe delivered no buffer, using sentinel");
            AUDIO_UNAVAILABLE.to_string()
        }
    }
}

/// Computes the fingerprint token for the given environment.
pub fn generate(source: &dyn SignalSource) -> Result<String> {
    let components = Components::collect(source);
    let raw = serde_json::to_string(&components)?;
    let token = hash_string(&raw);
    debug!(token = %token, "device fingerprint computed");
    Ok(token)
}

/// Signals read from the host running the binary.
///
/// Only host-wide readings are used. Per-shell state (`LANG`, `TZ`, terminal
/// size) differs between an interactive shell and cron on the same machine,
/// and the live UTC offset moves at every DST switch, so none of them feed
/// the fingerprint.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemSignals;

const LOCALE_FILES: [&str; 2] = ["/etc/locale.conf", "/etc/default/locale"];

impl SystemSignals {
    fn locale_tag(raw: &str) -> String {
        raw.split(['.', '@']).next().unwrap_or(raw).replace('_', "-")
    }

    fn proc_field(path: &str, field: &str) -> Option<String> {
        let text = std::fs::read_to_string(path).ok()?;
        text.lines().find_map(|line| {
            let (k, v) = line.split_once(':')?;
            (k.trim() == field).then(|| v.trim().to_string())
        })
    }

    /// `NAME=value` from the system locale configuration.
    fn system_locale(name: &str) -> Option<String> {
        LOCALE_FILES.iter().find_map(|path| {
            let text = std::fs::read_to_string(path).ok()?;
            text.lines().find_map(|line| {
                let (k, v) = line.split_once('=')?;
                let v = v.trim().trim_matches('"');
                (k.trim() == name && !v.is_empty()).then(|| v.to_string())
            })
        })
    }

    fn system_timezone() -> Option<String> {
        std::fs::read_to_string("/etc/timezone")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .or_else(|| {
                let target = std::fs::read_link("/etc/localtime").ok()?;
                let target = target.to_string_lossy();
                let (_, zone) = target.split_once("zoneinfo/")?;
                Some(zone.to_string())
            })
    }

    /// Offset in minutes on a fixed winter date, so the value stays put
    /// across DST switches.
    fn standard_offset_minutes() -> i32 {
        NaiveDate::from_ymd_opt(2001, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|at| -Local.offset_from_utc_datetime(&at).local_minus_utc() / 60)
            .unwrap_or(0)
    }
}

impl SignalSource for SystemSignals {
    fn environment(&self) -> Environment {
        let language = Self::system_locale("LANG").map(|l| Self::locale_tag(&l));
        let languages = Self::system_locale("LANGUAGE")
            .map(|l| l.split(':').map(Self::locale_tag).collect())
            .unwrap_or_default();
        let device_memory = Self::proc_field("/proc/meminfo", "MemTotal")
            .and_then(|v| v.split_whitespace().next()?.parse::<u64>().ok())
            .map(|kib| (kib / (1024 * 1024)) as u32)
            .unwrap_or(0);
        Environment {
            user_agent: Some(format!(
                "sbkp/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            )),
            language,
            languages,
            platform: Some(format!(
                "{}-{}",
                std::env::consts::FAMILY,
                std::env::consts::OS
            )),
            screen: None,
            timezone: Self::system_timezone(),
            timezone_offset: Self::standard_offset_minutes(),
            hardware_concurrency: thread::available_parallelism()
                .map(|n| n.get() as u32)
                .unwrap_or(0),
            device_memory,
        }
    }

    fn canvas(&self) -> Option<String> {
        let table = pretty_table(&[BANNER], vec![vec![BANNER.to_string()]]);
        Some(table.to_string())
    }

    fn renderer(&self) -> Option<(String, String)> {
        let model = Self::proc_field("/proc/cpuinfo", "model name")?;
        let vendor = Self::proc_field("/proc/cpuinfo", "vendor_id")
            .unwrap_or_else(|| UNKNOWN.to_string());
        Some((model, vendor))
    }

    fn audio(&self) -> Option<Receiver<Vec<f32>>> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("sbkp-audio-probe".into())
            .spawn(move || {
                // 440 Hz sine at 44.1 kHz through a muted gain stage.
                const RATE: f32 = 44_100.0;
                const FREQ: f32 = 440.0;
                let gain = 0.0_f32;
                let buf: Vec<f32> = (0..4096)
                    .map(|i| {
                        let phase = 2.0 * std::f32::consts::PI * FREQ * i as f32 / RATE;
                        phase.sin() * gain
                    })
                    .collect();
                let _ = tx.send(buf);
            })
            .ok()?;
        Some(rx)
    }
}
