//! Call-graph queries over the analyzer-reported symbols and call sites.

use serde::Serialize;
use std::collections::BTreeSet;
use tracing::debug;

use crate::database::{ContentStore, StoredCall};
use crate::error::{QuarryError, Result};
use crate::fuzzy;
use crate::utils::paths::normalize_relative;

/// One call site: `caller` (when resolvable) calls `callee` at `path:line`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct CallEdge {
    pub path: String,
    pub line: usize,
    pub caller: Option<String>,
    pub callee: String,
}

/// Calls into and out of one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileCallGraph {
    pub path: String,
    pub outgoing: Vec<CallEdge>,
    pub incoming: Vec<CallEdge>,
}

/// Every call to `symbol`, matched exactly or by a `.symbol` / `::symbol` suffix
///
/// The caller is the narrowest function, method or constructor enclosing the
/// call site, if any.
pub fn incoming_calls(store: &ContentStore, symbol: &str) -> Result<Vec<CallEdge>> {
    let calls = store.calls_matching_target(symbol)?;
    debug!("{} call sites target {}", calls.len(), symbol);

    let mut edges = Vec::with_capacity(calls.len());
    for call in calls {
        edges.push(resolve_caller(store, call)?);
    }
    edges.sort();
    edges.dedup();
    Ok(edges)
}

/// Calls made inside `symbol`'s body, optionally picking the definition in `file`
///
/// Fails with [`QuarryError::UnknownSymbol`] (carrying near-miss names) when
/// no definition exists.
pub fn outgoing_calls(
    store: &ContentStore,
    symbol: &str,
    file: Option<&str>,
) -> Result<Vec<CallEdge>> {
    let file = file.map(normalize_relative);
    let definitions = store.find_symbol_definitions(symbol, file.as_deref())?;

    if definitions.is_empty() {
        let names = store.symbol_names()?;
        return Err(QuarryError::UnknownSymbol {
            symbol: symbol.to_string(),
            suggestions: fuzzy::suggestions(symbol, &names),
        });
    }

    let mut edges = BTreeSet::new();
    for definition in &definitions {
        for call in
            store.calls_in_range(&definition.path, definition.line_start, definition.line_end)?
        {
            edges.insert(CallEdge {
                path: call.path,
                line: call.line,
                caller: Some(definition.name.clone()),
                callee: call.target,
            });
        }
    }

    debug!(
        "{} outgoing calls from {} definition(s) of {}",
        edges.len(),
        definitions.len(),
        symbol
    );
    Ok(edges.into_iter().collect())
}

/// Outgoing calls made from `file` plus incoming calls to symbols it defines,
/// leaving out calls from `file` to itself
pub fn call_graph(store: &ContentStore, file: &str) -> Result<FileCallGraph> {
    let path = normalize_relative(file);

    let mut outgoing = Vec::new();
    for call in store.calls_from_file(&path)? {
        outgoing.push(resolve_caller(store, call)?);
    }
    outgoing.sort();

    let names: BTreeSet<String> = store
        .symbols_in_file(&path)?
        .into_iter()
        .map(|symbol| symbol.name)
        .collect();

    let mut incoming = BTreeSet::new();
    for name in &names {
        for edge in incoming_calls(store, name)? {
            if edge.path != path {
                incoming.insert(edge);
            }
        }
    }

    Ok(FileCallGraph {
        path,
        outgoing,
        incoming: incoming.into_iter().collect(),
    })
}

fn resolve_caller(store: &ContentStore, call: StoredCall) -> Result<CallEdge> {
    let caller = store
        .enclosing_symbol(&call.path, call.line)?
        .map(|symbol| symbol.name);
    Ok(CallEdge {
        path: call.path,
        line: call.line,
        caller,
        callee: call.target,
    })
}
