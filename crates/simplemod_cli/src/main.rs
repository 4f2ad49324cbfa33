//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `simplemod_core` wiring:
//!   module registration, access install and one create-then-read.
//! - Keep output deterministic for quick local sanity checks.

use std::collections::BTreeMap;
use std::process::ExitCode;

use simplemod_core::db::open_db_in_memory;
use simplemod_core::{
    parse_access_csv, FieldValue, ModuleRegistry, RecordService, SqliteAccessRepository,
    SqliteRecordRepository, RECORD_ACCESS_CSV,
};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("simplemod_cli error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    println!("simplemod_core ping={}", simplemod_core::ping());
    println!("simplemod_core version={}", simplemod_core::core_version());

    let mut registry = ModuleRegistry::new();
    registry
        .register_simple_module()
        .map_err(|err| err.to_string())?;
    println!("modules registered={}", registry.len());

    let conn = open_db_in_memory().map_err(|err| err.to_string())?;

    let access_repo = SqliteAccessRepository::new(&conn);
    let rules = parse_access_csv(RECORD_ACCESS_CSV).map_err(|err| err.to_string())?;
    let installed = access_repo
        .install_rules(&rules)
        .map_err(|err| err.to_string())?;
    println!("access rules installed={installed}");

    let guard = access_repo.load_guard().map_err(|err| err.to_string())?;
    let repo = SqliteRecordRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = RecordService::new(repo, guard, "base.group_user");

    let mut values = BTreeMap::new();
    values.insert("name".to_string(), FieldValue::Text("Test".to_string()));
    values.insert(
        "description".to_string(),
        FieldValue::Text("A test record.".to_string()),
    );
    let record = service
        .create_from_values(&values)
        .map_err(|err| err.to_string())?;

    let loaded = service
        .get_record(record.uuid, false)
        .map_err(|err| err.to_string())?
        .ok_or_else(|| "created record should be readable".to_string())?;
    println!("record name={} active={}", loaded.name, loaded.active);

    Ok(())
}
