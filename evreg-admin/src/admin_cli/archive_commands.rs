use clap::Subcommand;
use diesel::sqlite::SqliteConnection;
use evreg_api::archive::service::{archived_registrations, archived_users, normalize_ids};
use evreg_api::archive::{Actor, EntityFamily, bulk_archive, bulk_purge, bulk_restore};

use super::utils::build_matcher;

#[derive(Subcommand)]
pub enum ArchiveAction {
    #[command(about = "Archive users or registrations; soft-delete events")]
    Delete {
        #[arg(help = "users, events or registrations")]
        family: EntityFamily,
        #[arg(required = true, value_delimiter = ',', help = "Comma-separated ids")]
        ids: Vec<i64>,
    },
    #[command(about = "Restore archived rows (archive ids for users/registrations, event ids for events)")]
    Restore {
        #[arg(help = "users, events or registrations")]
        family: EntityFamily,
        #[arg(required = true, value_delimiter = ',', help = "Comma-separated ids")]
        ids: Vec<i64>,
    },
    #[command(about = "Permanently delete archived rows or soft-deleted events")]
    Purge {
        #[arg(help = "users, events or registrations")]
        family: EntityFamily,
        #[arg(required = true, value_delimiter = ',', help = "Comma-separated ids")]
        ids: Vec<i64>,
    },
    #[command(about = "List archived users, optionally filtered by email")]
    LsUsers {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
    #[command(about = "List archived registrations, optionally filtered by user email")]
    LsRegistrations {
        #[arg(help = "Search term (regex by default, use -F for fixed string)")]
        search_term: Option<String>,
        #[arg(short = 'F', long = "fixed-string", help = "Treat search term as fixed string instead of regex")]
        fixed_string: bool,
    },
}

pub fn handle_archive_command_with_conn(
    conn: &mut SqliteConnection,
    actor: &Actor,
    action: ArchiveAction,
) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ArchiveAction::Delete { family, ids } => delete_impl(conn, actor, family, &ids),
        ArchiveAction::Restore { family, ids } => restore_impl(conn, actor, family, &ids),
        ArchiveAction::Purge { family, ids } => purge_impl(conn, actor, family, &ids),
        ArchiveAction::LsUsers {
            search_term,
            fixed_string,
        } => list_archived_users_impl(conn, search_term, fixed_string),
        ArchiveAction::LsRegistrations {
            search_term,
            fixed_string,
        } => list_archived_registrations_impl(conn, search_term, fixed_string),
    }
}

pub fn delete_impl(
    conn: &mut SqliteConnection,
    actor: &Actor,
    family: EntityFamily,
    raw_ids: &[i64],
) -> Result<(), Box<dyn std::error::Error>> {
    let ids = normalize_ids(raw_ids)?;
    let summary = bulk_archive(conn, family, &ids, actor)?;
    println!("Archived {} {}: {:?}", summary.archived_count, family, summary.archived_ids);
    if !summary.cascaded_registration_ids.is_empty() {
        println!("  Also archived registrations: {:?}", summary.cascaded_registration_ids);
    }
    Ok(())
}

pub fn restore_impl(
    conn: &mut SqliteConnection,
    actor: &Actor,
    family: EntityFamily,
    raw_ids: &[i64],
) -> Result<(), Box<dyn std::error::Error>> {
    let ids = normalize_ids(raw_ids)?;
    let report = bulk_restore(conn, family, &ids, actor)?;
    println!(
        "Restored {} of {} {}: {:?}",
        report.restored, report.requested, family, report.restored_ids
    );
    for skip in &report.skipped {
        println!("  Skipped ID {}: {}", skip.id, skip.reason);
    }
    Ok(())
}

pub fn purge_impl(
    conn: &mut SqliteConnection,
    actor: &Actor,
    family: EntityFamily,
    raw_ids: &[i64],
) -> Result<(), Box<dyn std::error::Error>> {
    let ids = normalize_ids(raw_ids)?;
    let summary = bulk_purge(conn, family, &ids, actor)?;
    println!("Permanently deleted {} {}", summary.deleted_count, family);
    Ok(())
}

pub fn list_archived_users_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matches = build_matcher(search_term, fixed_string)?;
    let rows: Vec<_> = archived_users(conn)?
        .into_iter()
        .filter(|row| matches(&row.email))
        .collect();

    if rows.is_empty() {
        println!("No archived users found.");
        return Ok(());
    }
    println!("Archived users:");
    for row in rows {
        println!(
            "  Archive ID: {}, User ID: {}, Email: {}, Deleted: {}, Source: {}",
            row.archive_id, row.original_user_id, row.email, row.deleted_at, row.deletion_source
        );
    }
    Ok(())
}

pub fn list_archived_registrations_impl(
    conn: &mut SqliteConnection,
    search_term: Option<String>,
    fixed_string: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let matches = build_matcher(search_term, fixed_string)?;
    let rows: Vec<_> = archived_registrations(conn)?
        .into_iter()
        .filter(|row| matches(&row.user_email))
        .collect();

    if rows.is_empty() {
        println!("No archived registrations found.");
        return Ok(());
    }
    println!("Archived registrations:");
    for row in rows {
        println!(
            "  Archive ID: {}, Registration ID: {}, User: {}, Event: {} ({}), Source: {}",
            row.archive_id,
            row.original_registration_id,
            row.user_email,
            row.event_title,
            row.event_date,
            row.deletion_source
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin_cli::utils::get_or_create_admin_user;
    use evreg_api::orm::audit_log::list_audit_logs_for_action;
    use evreg_api::orm::registration::get_registration;
    use evreg_api::orm::testing::{seed_fixture, setup_test_db};
    use evreg_api::orm::user::get_user;

    #[test]
    fn test_delete_and_restore_registration_via_cli() {
        let mut conn = setup_test_db();
        let fixture = seed_fixture(&mut conn).expect("seed fixture");
        let actor = get_or_create_admin_user(&mut conn).expect("cli admin");
        let registration_id = fixture.registrations[0].id;

        let result = handle_archive_command_with_conn(
            &mut conn,
            &actor,
            ArchiveAction::Delete {
                family: EntityFamily::Registrations,
                ids: vec![registration_id as i64, registration_id as i64],
            },
        );
        assert!(result.is_ok());
        assert!(get_registration(&mut conn, registration_id).unwrap().is_none());

        let archived = archived_registrations(&mut conn).unwrap();
        assert_eq!(archived.len(), 1);

        let result = handle_archive_command_with_conn(
            &mut conn,
            &actor,
            ArchiveAction::Restore {
                family: EntityFamily::Registrations,
                ids: vec![archived[0].archive_id as i64],
            },
        );
        assert!(result.is_ok());
        assert!(get_registration(&mut conn, registration_id).unwrap().is_some());

        let audit = list_audit_logs_for_action(&mut conn, "registration.bulk_restore").unwrap();
        assert_eq!(audit.len(), 1);
        assert_eq!(audit[0].actor_id, actor.id);
    }

    #[test]
    fn test_purge_archived_user_via_cli() {
        let mut conn = setup_test_db();
        let fixture = seed_fixture(&mut conn).expect("seed fixture");
        let actor = get_or_create_admin_user(&mut conn).expect("cli admin");

        delete_impl(&mut conn, &actor, EntityFamily::Users, &[fixture.carol.id as i64]).unwrap();
        assert!(get_user(&mut conn, fixture.carol.id).unwrap().is_none());

        let archive_id = archived_users(&mut conn).unwrap()[0].archive_id;
        purge_impl(&mut conn, &actor, EntityFamily::Users, &[archive_id as i64]).unwrap();
        assert!(archived_users(&mut conn).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_ids_are_rejected() {
        let mut conn = setup_test_db();
        let actor = get_or_create_admin_user(&mut conn).expect("cli admin");

        assert!(delete_impl(&mut conn, &actor, EntityFamily::Events, &[]).is_err());
        assert!(delete_impl(&mut conn, &actor, EntityFamily::Events, &[0]).is_err());
        assert!(restore_impl(&mut conn, &actor, EntityFamily::Users, &[i64::MAX]).is_err());
    }

    #[test]
    fn test_list_with_bad_regex_fails() {
        let mut conn = setup_test_db();
        assert!(list_archived_users_impl(&mut conn, Some("[".to_string()), false).is_err());
        assert!(list_archived_registrations_impl(&mut conn, Some("[".to_string()), true).is_ok());
    }
}
