use crate::auth::password::hash_password;
use crate::config::{AppConfig, SeedAccount};
use crate::db::UserStore;
use common::model::user::Role;
use log::info;

/// Creates the configured super-admin and end-user accounts that do not exist yet.
///
/// Existing accounts are left untouched, including their passwords. Returns the number
/// of accounts created.
pub fn seed_users<S: UserStore + ?Sized>(
    store: &S,
    config: &AppConfig,
) -> Result<usize, Box<dyn std::error::Error>> {
    let accounts: [(&Option<SeedAccount>, Role); 2] = [
        (&config.super_admin, Role::SuperAdmin),
        (&config.end_user, Role::EndUser),
    ];

    let mut created = 0;
    for (account, role) in accounts {
        let Some(account) = account else { continue };
        if store.find_user_by_email(&account.email)?.is_some() {
            continue;
        }
        let hash = hash_password(&account.password)?;
        store.create_user(&account.email, &hash, role)?;
        info!("Seeded {} account {}", role, account.email);
        created += 1;
    }
    Ok(created)
}
