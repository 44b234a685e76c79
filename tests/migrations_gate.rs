use std::fs;
use std::path::{Path, PathBuf};

fn collect_migration_files() -> Vec<PathBuf> {
    let repo_root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let migrations_root = repo_root.join("migrations");
    let mut files: Vec<PathBuf> = fs::read_dir(&migrations_root)
        .expect("migrations directory exists")
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("sql"))
        .collect();
    files.sort();
    files
}

#[test]
fn migrations_are_additive_only() {
    let mut offenders = Vec::new();
    for file in collect_migration_files() {
        let content = fs::read_to_string(&file).unwrap_or_default();
        let upper = content.to_uppercase();
        let name = file.file_name().unwrap().to_string_lossy().to_string();

        if upper.contains("DROP TABLE") {
            offenders.push(format!("{}: contains DROP TABLE", name));
        }
        if upper.contains("DROP COLUMN") {
            offenders.push(format!("{}: contains DROP COLUMN", name));
        }
        if upper.contains("TRUNCATE") {
            offenders.push(format!("{}: contains TRUNCATE", name));
        }
        // One-off data deletion lives in the purge tooling, not migrations
        if upper.contains("DELETE FROM") {
            offenders.push(format!("{}: contains DELETE FROM", name));
        }
    }

    assert!(
        offenders.is_empty(),
        "destructive statement found in migrations:\n{}",
        offenders.join("\n")
    );
}

#[test]
fn create_table_statements_are_guarded() {
    let mut offenders = Vec::new();
    for file in collect_migration_files() {
        let content = fs::read_to_string(&file).unwrap_or_default();
        let name = file.file_name().unwrap().to_string_lossy().to_string();
        for (idx, line) in content.lines().enumerate() {
            let upper = line.trim().to_uppercase();
            if upper.starts_with("CREATE TABLE") && !upper.contains("IF NOT EXISTS") {
                offenders.push(format!("{}:{}: {}", name, idx + 1, line.trim()));
            }
            if upper.starts_with("CREATE INDEX") && !upper.contains("IF NOT EXISTS") {
                offenders.push(format!("{}:{}: {}", name, idx + 1, line.trim()));
            }
            if upper.starts_with("ALTER TABLE")
                && upper.contains("ADD COLUMN")
                && !upper.contains("IF NOT EXISTS")
            {
                offenders.push(format!("{}:{}: {}", name, idx + 1, line.trim()));
            }
        }
    }

    assert!(
        offenders.is_empty(),
        "unguarded DDL found in migrations:\n{}",
        offenders.join("\n")
    );
}

#[test]
fn migration_files_are_ordered_and_unique() {
    let files = collect_migration_files();
    assert!(!files.is_empty(), "no migration files found");

    let mut prefixes = Vec::new();
    for file in &files {
        let name = file.file_name().unwrap().to_string_lossy().to_string();
        let prefix: String = name.chars().take_while(|c| c.is_ascii_digit()).collect();
        assert!(
            !prefix.is_empty(),
            "{} does not start with a numeric version prefix",
            name
        );
        prefixes.push(prefix);
    }

    let mut deduped = prefixes.clone();
    deduped.dedup();
    assert_eq!(prefixes, deduped, "duplicate migration version prefix");
}
