//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::ExportFormat;
use crate::config::{Backend, Config};
use labgraph_core::{
    AttributeValue, Attributes, CancellationToken, Direction, Graph, GraphError, LineWriter,
    PathReporter, Route, SerializableGraph, Session, demo, graph_from_bytes, graph_to_bytes,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum file size for import (500 MB).
const MAX_IMPORT_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), GraphError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| GraphError::IoError(format!("Cannot read file metadata: {}", e)))?;

    if metadata.len() > max_size {
        return Err(GraphError::SerializationError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

/// Canonicalize an input path and make sure it is a regular file.
fn validate_file_path(path: &Path) -> Result<PathBuf, GraphError> {
    let canonical = path.canonicalize().map_err(|e| {
        GraphError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(GraphError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    Ok(canonical)
}

/// Resolve the parent directory of an output path.
fn validate_output_path(path: &Path) -> Result<PathBuf, GraphError> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        GraphError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(GraphError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| GraphError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

// =============================================================================
// INIT COMMAND
// =============================================================================

/// Initialize new database.
pub fn cmd_init(config: &Config, force: bool) -> Result<(), GraphError> {
    let db_path = &config.database;
    if db_path.exists() {
        if !force {
            return Err(GraphError::IoError(
                "Database already exists. Use --force to overwrite.".to_string(),
            ));
        }
        std::fs::remove_file(db_path)
            .map_err(|e| GraphError::IoError(format!("Remove existing database: {}", e)))?;
    }

    match config.backend {
        Backend::Redb => {
            let _session = Session::with_redb(db_path)?;
            println!("Initialized new redb database at {:?}", db_path);
        }
        Backend::File => {
            save_session(&Session::new(), db_path)?;
            println!("Initialized new file database at {:?}", db_path);
        }
    }

    tracing::info!(database = %db_path.display(), backend = %config.backend, "database initialized");
    Ok(())
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show graph status.
pub fn cmd_status(config: &Config, json_mode: bool) -> Result<(), GraphError> {
    let session = load_or_create_session(config)?;
    let nodes = session.node_count()?;
    let relationships = session.relationship_count()?;

    if json_mode {
        print_json(&serde_json::json!({
            "database": config.database.to_string_lossy(),
            "backend": config.backend.to_string(),
            "key_attribute": config.key_attribute,
            "node_count": nodes,
            "relationship_count": relationships,
        }));
        return Ok(());
    }

    println!("labgraph Status");
    println!("===============");
    println!("Database:      {:?}", config.database);
    println!("Backend:       {}", config.backend);
    println!("Key attribute: {}", config.key_attribute);
    println!();
    println!("Nodes:         {}", nodes);
    println!("Relationships: {}", relationships);

    Ok(())
}

// =============================================================================
// POPULATE COMMAND
// =============================================================================

/// Build the demo graph into the configured database.
pub fn cmd_populate(config: &Config, json_mode: bool) -> Result<(), GraphError> {
    let mut session = load_or_create_session(config)?;
    if session.node_count()? > 0 {
        tracing::warn!("database is not empty; demo nodes are added alongside existing ones");
    }

    let created = demo::populate(session.store_mut())?;
    save_session(&session, &config.database)?;

    let nodes = created.a.len() + created.b.len() + created.c.len();
    tracing::info!(nodes, relationships = created.relationships, "demo graph populated");

    if json_mode {
        print_json(&serde_json::json!({
            "nodes_created": nodes,
            "relationships_created": created.relationships,
        }));
    } else {
        println!(
            "Populated demo graph: {} nodes, {} relationships",
            nodes, created.relationships
        );
    }
    Ok(())
}

// =============================================================================
// NODE COMMAND
// =============================================================================

/// Parse `key=value` pairs.
///
/// The key attribute always stays text so `(label, key)` addressing finds
/// the node again; other values go through `AttributeValue::parse_literal`.
pub fn parse_attributes(pairs: &[String], key_attribute: &str) -> Result<Attributes, GraphError> {
    let mut attributes = Attributes::new();
    for pair in pairs {
        let (name, raw) = pair.split_once('=').ok_or_else(|| {
            GraphError::InvalidAttribute(format!("expected key=value, got '{}'", pair))
        })?;
        let name = name.trim();
        let value = if name == key_attribute {
            AttributeValue::from(raw)
        } else {
            AttributeValue::parse_literal(raw)
        };
        attributes.insert(name.to_string(), value);
    }
    Ok(attributes)
}

/// Create a node.
pub fn cmd_node(
    config: &Config,
    json_mode: bool,
    label: &str,
    pairs: &[String],
) -> Result<(), GraphError> {
    let attributes = parse_attributes(pairs, &config.key_attribute)?;
    let mut session = load_or_create_session(config)?;
    let node = session.create_node(label, attributes)?;
    save_session(&session, &config.database)?;

    if json_mode {
        print_json(&serde_json::json!({ "node": node }));
    } else {
        println!("Created node {} ({})", node.id, node.label);
    }
    Ok(())
}

// =============================================================================
// RELATE COMMAND
// =============================================================================

/// Create a relationship between two keyed nodes.
pub fn cmd_relate(
    config: &Config,
    json_mode: bool,
    from: (&str, &str),
    to: (&str, &str),
    rel_type: &str,
) -> Result<(), GraphError> {
    let mut session = load_or_create_session(config)?;
    let source = session.selector(from.0, from.1);
    let target = session.selector(to.0, to.1);
    let relationship = session.relate(&source, &target, rel_type)?;
    save_session(&session, &config.database)?;

    if json_mode {
        print_json(&serde_json::json!({ "relationship": relationship }));
    } else {
        println!(
            "Created relationship {}: ({}) {} -[{}]-> ({}) {}",
            relationship.id, from.0, from.1, rel_type, to.0, to.1
        );
    }
    Ok(())
}

// =============================================================================
// SET COMMAND
// =============================================================================

/// Set attributes on a keyed node.
pub fn cmd_set(
    config: &Config,
    json_mode: bool,
    target: (&str, &str),
    pairs: &[String],
) -> Result<(), GraphError> {
    let attributes = parse_attributes(pairs, &config.key_attribute)?;
    let mut session = load_or_create_session(config)?;
    let node = session
        .find_node(target.0, target.1)?
        .ok_or_else(|| GraphError::NodeNotFound(session.selector(target.0, target.1)))?;

    for (name, value) in attributes {
        session.set_attribute(node.id, &name, value)?;
    }
    save_session(&session, &config.database)?;

    if json_mode {
        print_json(&serde_json::json!({ "node": session.store().node(node.id)? }));
    } else {
        println!("Updated node {} ({}) {}", node.id, target.0, target.1);
    }
    Ok(())
}

// =============================================================================
// ROUTE COMMAND
// =============================================================================

/// Find the shortest route. Ctrl-C cancels a running search.
///
/// A missing route is reported, not treated as a failure.
pub async fn cmd_route(
    config: &Config,
    json_mode: bool,
    from: (String, String),
    to: (String, String),
) -> Result<(), GraphError> {
    let session = load_or_create_session(config)?;
    let token = CancellationToken::new();
    let search_token = token.clone();
    let mut search = tokio::task::spawn_blocking(move || {
        session.find_route_with_cancellation(&from.0, &from.1, &to.0, &to.1, search_token)
    });

    let joined = tokio::select! {
        joined = &mut search => joined,
        Ok(()) = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupt received, cancelling route search");
            token.cancel();
            search.await
        }
    };
    let result = joined.map_err(|e| GraphError::IoError(format!("Route search task failed: {}", e)))?;

    match result {
        Ok(route) => report_route(config, json_mode, &route),
        Err(GraphError::NoRoute { from: source, to: target }) => {
            tracing::info!(from = %source, to = %target, "no route");
            if json_mode {
                print_json(&serde_json::json!({
                    "found": false,
                    "from": source.to_string(),
                    "to": target.to_string(),
                }));
            } else {
                println!("No route from {} to {}", source, target);
            }
            Ok(())
        }
        Err(e) => Err(e),
    }
}

fn report_route(config: &Config, json_mode: bool, route: &Route) -> Result<(), GraphError> {
    let reporter = PathReporter::new(config.key_attribute.as_str());
    tracing::info!(hops = route.hops(), explored = route.explored, "route found");

    if json_mode {
        print_json(&serde_json::json!({
            "found": true,
            "hops": route.hops(),
            "explored": route.explored,
            "path": reporter.render(route),
            "nodes": route.nodes,
        }));
        return Ok(());
    }

    let stdout = std::io::stdout();
    let mut sink = LineWriter::new(stdout.lock());
    reporter.report(route, &mut sink)
}

// =============================================================================
// RELS COMMAND
// =============================================================================

/// List the relationships of a keyed node.
pub fn cmd_rels(
    config: &Config,
    json_mode: bool,
    label: &str,
    key: &str,
    direction: Direction,
) -> Result<(), GraphError> {
    let session = load_or_create_session(config)?;
    let views = session.list_relationships(label, key, direction)?;

    if json_mode {
        print_json(&serde_json::json!({ "relationships": views }));
        return Ok(());
    }

    if views.is_empty() {
        println!("No relationships for ({}) {}", label, key);
    }
    for view in &views {
        println!("{}", view);
    }
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Export graph.
pub fn cmd_export(config: &Config, output: &Path, format: ExportFormat) -> Result<(), GraphError> {
    let validated_output = validate_output_path(output)?;

    let session = load_or_create_session(config)?;
    let graph = session.snapshot()?;

    let data = match format {
        ExportFormat::Binary => graph_to_bytes(&graph)?,
        ExportFormat::Json => serde_json::to_vec_pretty(&SerializableGraph::from(&graph))
            .map_err(|e| GraphError::SerializationError(e.to_string()))?,
    };

    std::fs::write(&validated_output, &data)
        .map_err(|e| GraphError::IoError(format!("Write file: {}", e)))?;

    println!("Exported {} bytes to {:?}", data.len(), validated_output);
    Ok(())
}

// =============================================================================
// IMPORT COMMAND
// =============================================================================

/// Import graph (file backend only).
pub fn cmd_import(config: &Config, input: &Path) -> Result<(), GraphError> {
    if config.backend == Backend::Redb {
        return Err(GraphError::IoError(
            "Import to redb not supported. Use file backend.".to_string(),
        ));
    }

    let validated_path = validate_file_path(input)?;
    validate_file_size(&validated_path, MAX_IMPORT_FILE_SIZE)?;

    let data = std::fs::read(&validated_path)
        .map_err(|e| GraphError::IoError(format!("Read file: {}", e)))?;
    let session = Session::with_graph(decode_snapshot(&data)?);
    save_session(&session, &config.database)?;

    println!(
        "Imported graph: {} nodes, {} relationships",
        session.node_count()?,
        session.relationship_count()?
    );
    Ok(())
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Decode a binary snapshot, falling back to JSON.
fn decode_snapshot(data: &[u8]) -> Result<Graph, GraphError> {
    if let Ok(graph) = graph_from_bytes(data) {
        return Ok(graph);
    }
    if let Ok(serializable) = serde_json::from_slice::<SerializableGraph>(data) {
        return Graph::try_from(serializable);
    }
    Err(GraphError::SerializationError(
        "Could not parse database file".to_string(),
    ))
}

/// Load or create a session for the configured database and backend.
pub fn load_or_create_session(config: &Config) -> Result<Session, GraphError> {
    let session = match config.backend {
        Backend::Redb => Session::with_redb(&config.database)?,
        Backend::File => {
            if config.database.exists() {
                validate_file_size(&config.database, MAX_IMPORT_FILE_SIZE)?;
                let data = std::fs::read(&config.database)
                    .map_err(|e| GraphError::IoError(format!("Read db: {}", e)))?;
                Session::with_graph(decode_snapshot(&data)?)
            } else {
                Session::new()
            }
        }
    };
    Ok(session.with_key_attribute(config.key_attribute.as_str()))
}

/// Save a session to a database path.
pub fn save_session(session: &Session, db_path: &Path) -> Result<(), GraphError> {
    if session.is_persistent() {
        // Redb backend - already persisted, nothing to do
        return Ok(());
    }

    let graph = session.graph_opt().ok_or_else(|| {
        GraphError::SerializationError("No graph available for export".to_string())
    })?;
    let data = graph_to_bytes(graph)?;
    std::fs::write(db_path, &data).map_err(|e| GraphError::IoError(format!("Write db: {}", e)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_attribute_stays_text() {
        let pairs = vec![
            "name=5".to_string(),
            "rank=5".to_string(),
            "open=true".to_string(),
            "note=five".to_string(),
        ];
        let attributes = parse_attributes(&pairs, "name").expect("parse");

        assert_eq!(attributes.get("name"), Some(&AttributeValue::from("5")));
        assert_eq!(attributes.get("rank"), Some(&AttributeValue::Integer(5)));
        assert_eq!(attributes.get("open"), Some(&AttributeValue::Boolean(true)));
        assert_eq!(attributes.get("note"), Some(&AttributeValue::from("five")));
    }

    #[test]
    fn malformed_pair_rejected() {
        let result = parse_attributes(&["missing-separator".to_string()], "name");
        assert!(matches!(result, Err(GraphError::InvalidAttribute(_))));
    }

    #[test]
    fn value_may_contain_separator() {
        let attributes = parse_attributes(&["expr=a=b".to_string()], "name").expect("parse");
        assert_eq!(attributes.get("expr"), Some(&AttributeValue::from("a=b")));
    }
}
