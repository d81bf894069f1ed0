//! 本地文件存储服务
//!
//! - care.json：关注列表，每次整体覆盖，并在 data 目录留存当日备份
//! - result.json：累计结算记录，只追加不修改
//!
//! 读取失败按空数据处理（无法解析的文件先另存一份），写入失败返回错误由调用方记录

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::RunContext;
use crate::models::{SettledRecord, SettlementLedger, WatchedInstrument};

/// 以 4 空格缩进写出 JSON，中文不转义
fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, buf).with_context(|| format!("写入 {} 失败", path.display()))?;
    Ok(())
}

/// 旧版工具写出的 JSON 中可能含 NaN / Infinity，读取前替换为 null
fn replace_non_finite(content: &str) -> Cow<'_, str> {
    if !content.contains("NaN") && !content.contains("Infinity") {
        return Cow::Borrowed(content);
    }

    let mut out = String::with_capacity(content.len());
    let mut rest = content;
    let mut in_string = false;
    let mut escaped = false;

    while let Some(c) = rest.chars().next() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
        } else if c == '"' {
            in_string = true;
        } else if let Some(token) = NON_FINITE_TOKENS.iter().find(|t| rest.starts_with(**t)) {
            out.push_str("null");
            rest = &rest[token.len()..];
            continue;
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    Cow::Owned(out)
}

const NON_FINITE_TOKENS: [&str; 3] = ["-Infinity", "Infinity", "NaN"];

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&replace_non_finite(&content))?)
}

/// 无法解析的文件在被覆盖前另存一份，文件名追加 .bad-YYYY-MM-DD
fn set_aside(ctx: &RunContext, path: &Path) {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".bad-{}", ctx.today_str()));
    let target = PathBuf::from(name);

    match fs::copy(path, &target) {
        Ok(_) => log::warn!("已将无法解析的 {} 另存为 {}", path.display(), target.display()),
        Err(e) => log::error!("另存 {} 失败: {}", path.display(), e),
    }
}

/// 加载关注列表
pub fn load_watchlist(ctx: &RunContext) -> Vec<WatchedInstrument> {
    let path = &ctx.watchlist_file;
    if !path.exists() {
        log::info!("{} 文件不存在，返回空列表", path.display());
        return Vec::new();
    }

    match read_json::<Vec<WatchedInstrument>>(path) {
        Ok(stocks) => {
            log::info!("成功加载关注股票列表，共{}只股票", stocks.len());
            stocks
        }
        Err(e) => {
            log::error!("读取 {} 失败: {:#}", path.display(), e);
            set_aside(ctx, path);
            Vec::new()
        }
    }
}

/// 加载历史结算记录
pub fn load_settlements(ctx: &RunContext) -> Vec<SettledRecord> {
    let path = &ctx.ledger_file;
    if !path.exists() {
        log::info!("{} 文件不存在，返回空列表", path.display());
        return Vec::new();
    }

    match read_json::<SettlementLedger>(path) {
        Ok(ledger) => {
            log::info!("成功加载历史结算记录，共{}条记录", ledger.settled_stocks.len());
            ledger.settled_stocks
        }
        Err(e) => {
            log::error!("读取 {} 失败: {:#}", path.display(), e);
            set_aside(ctx, path);
            Vec::new()
        }
    }
}

/// 保存关注列表并备份到 data 目录
pub fn save_watchlist(ctx: &RunContext, stocks: &[WatchedInstrument]) -> Result<()> {
    write_json(&ctx.watchlist_file, &stocks)?;

    let backup = ctx.watchlist_backup_file();
    if let Some(parent) = backup.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(&ctx.watchlist_file, &backup)
        .with_context(|| format!("备份到 {} 失败", backup.display()))?;

    log::info!(
        "{} 已保存，备份文件: {}",
        ctx.watchlist_file.display(),
        backup.display()
    );
    Ok(())
}

/// 合并历史与本次结算记录，历史在前
pub fn merge_settlements(
    previous: Vec<SettledRecord>,
    settled: &[SettledRecord],
) -> Vec<SettledRecord> {
    let mut all = previous;
    all.extend_from_slice(settled);
    all
}

/// 保存全部结算记录
pub fn save_settlements(ctx: &RunContext, settled: &[SettledRecord]) -> Result<()> {
    let ledger = SettlementLedger {
        last_update: ctx.run_time.clone(),
        settled_stocks: settled.to_vec(),
    };
    write_json(&ctx.ledger_file, &ledger)?;

    log::info!(
        "{} 已保存，共{}条结算记录",
        ctx.ledger_file.display(),
        settled.len()
    );
    Ok(())
}
