//! Working-memory subcommands. Each writes pretty JSON to `out`.

use std::io::{Read, Write};
use std::path::Path;

use serde_json::json;
use wm_core::{WorkingMemory, WorkingMemoryManager};
use wm_domain::config::WorkingMemoryConfig;

use super::Scope;

/// `wmctl list`
pub async fn list(
    manager: &WorkingMemoryManager,
    cfg: &WorkingMemoryConfig,
    namespace: Option<String>,
    user_id: Option<String>,
    limit: Option<usize>,
    offset: usize,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let namespace = namespace.or_else(|| cfg.default_namespace.clone());
    let limit = limit.unwrap_or(cfg.default_list_limit);

    let (total, sessions) = manager
        .list_sessions(limit, offset, namespace.as_deref(), user_id.as_deref())
        .await?;

    write_json(
        out,
        &json!({
            "namespace": namespace,
            "total": total,
            "sessions": sessions,
        }),
    )
}

/// `wmctl get`. Returns `false` when no document exists.
pub async fn get(
    manager: &WorkingMemoryManager,
    cfg: &WorkingMemoryConfig,
    session_id: &str,
    scope: Scope,
    recent: Option<usize>,
    out: &mut impl Write,
) -> anyhow::Result<bool> {
    let namespace = scope.namespace.or_else(|| cfg.default_namespace.clone());

    match manager
        .get_working_memory(session_id, scope.user_id.as_deref(), namespace.as_deref(), recent)
        .await
    {
        Some(wm) => {
            write_json(out, &wm)?;
            Ok(true)
        }
        None => {
            eprintln!("no working memory for session {session_id}");
            Ok(false)
        }
    }
}

/// `wmctl put`. Reads the document from `file`, or stdin when `file` is `-`.
pub async fn put(
    manager: &WorkingMemoryManager,
    file: &Path,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let raw = if file == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(file)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", file.display()))?
    };

    let wm: WorkingMemory = serde_json::from_str(&raw)
        .map_err(|e| anyhow::anyhow!("parsing {}: {e}", file.display()))?;
    if wm.session_id.is_empty() {
        anyhow::bail!("{}: session_id is required", file.display());
    }

    let stored = manager.set_working_memory(wm).await?;
    write_json(out, &stored)
}

/// `wmctl delete`
pub async fn delete(
    manager: &WorkingMemoryManager,
    cfg: &WorkingMemoryConfig,
    session_id: &str,
    scope: Scope,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    let namespace = scope.namespace.or_else(|| cfg.default_namespace.clone());
    manager
        .delete_working_memory(session_id, scope.user_id.as_deref(), namespace.as_deref())
        .await?;
    write_json(out, &json!({ "deleted": session_id }))
}

fn write_json(out: &mut impl Write, value: &impl serde::Serialize) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
