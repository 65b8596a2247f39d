use diesel::prelude::*;
use dotenvy::dotenv;
use rocket::fairing::AdHoc;

use crate::models::{NewUser, roles};
use crate::orm::DbConn;
use crate::orm::login::hash_password;
use crate::orm::user::{get_user_by_email, insert_user};

/// Add the default admin user if needed.
///
/// Set the default admin email/pass based on envars EVREG_DEFAULT_EMAIL and EVREG_DEFAULT_PASSWORD
pub fn admin_init_fairing() -> AdHoc {
    AdHoc::try_on_ignite("Admin User Initialization", |rocket| async {
        dotenv().ok();

        let conn = match DbConn::get_one(&rocket).await {
            Some(conn) => conn,
            None => {
                error!("[admin-init] ERROR: Could not get DB connection.");
                return Err(rocket);
            }
        };

        let admin_email = get_admin_email();
        match conn.run(move |c| create_admin_user_if_needed(c, &admin_email)).await {
            Ok(()) => Ok(rocket),
            Err(e) => {
                error!("[admin-init] FATAL: Admin user creation failed: {:?}", e);
                Err(rocket)
            }
        }
    })
}

fn get_admin_email() -> String {
    std::env::var("EVREG_DEFAULT_EMAIL").unwrap_or_else(|_| "superadmin@example.com".to_string())
}

fn get_admin_password() -> String {
    std::env::var("EVREG_DEFAULT_PASSWORD").unwrap_or_else(|_| "admin".to_string())
}

fn create_admin_user_if_needed(c: &mut SqliteConnection, admin_email: &str) -> Result<(), diesel::result::Error> {
    if get_user_by_email(c, admin_email)?.is_some() {
        info!("[admin-init] Admin user '{}' already exists", admin_email);
        return Ok(());
    }

    let admin_user = NewUser {
        name: "Administrator".to_string(),
        email: admin_email.to_string(),
        password_hash: hash_password(&get_admin_password()),
        role: roles::ADMIN.to_string(),
        company: None,
        phone: None,
        bio: None,
    };

    match insert_user(c, admin_user) {
        Ok(_) => {
            info!("[admin-init] Created admin user: '{}'", admin_email);
            Ok(())
        }
        Err(e) => {
            error!("[admin-init] ERROR creating admin user: {:?}", e);
            Err(e)
        }
    }
}
