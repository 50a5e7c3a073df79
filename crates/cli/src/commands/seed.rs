//! Seed the database with demo data.
//!
//! Creates a handful of organizations, donor and recipient accounts, and a
//! spread of items over the last `days` days. Older items are mostly claimed
//! so the analytics endpoints have history to work with; recent ones stay
//! listed and show up in the risk report.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;

use foodbridge_core::{
    Clock, Email, ItemClaim, ItemStatus, NewItem, NewOrganization, Organization, SystemClock, User,
    UserRole,
};
use foodbridge_server::db::{ItemRepository, OrganizationRepository, UserRepository};

use super::{CommandError, connect};

struct DemoOrg {
    name: &'static str,
    kind: &'static str,
    address: &'static str,
    lat: f64,
    lng: f64,
    email: Option<&'static str>,
}

const ORGANIZATIONS: &[DemoOrg] = &[
    DemoOrg {
        name: "Eastside Community Pantry",
        kind: "pantry",
        address: "120 Elm St",
        lat: 44.9778,
        lng: -93.2650,
        email: Some("pantry@example.org"),
    },
    DemoOrg {
        name: "Riverside Bakery",
        kind: "restaurant",
        address: "8 Mill Rd",
        lat: 44.9812,
        lng: -93.2731,
        email: Some("orders@riverside.example.com"),
    },
    DemoOrg {
        name: "Campus Dining Hall",
        kind: "campus",
        address: "1 University Ave",
        lat: 44.9740,
        lng: -93.2277,
        email: None,
    },
];

const DONORS: &[(&str, &str)] = &[
    ("Dana Ortiz", "dana@example.org"),
    ("Sam Lee", "sam@example.org"),
    ("Priya Nair", "priya@example.org"),
];

const RECIPIENTS: &[(&str, &str, &str)] = &[
    ("Alex Kim", "alex@example.net", "555-0101"),
    ("Jordan Bell", "jordan@example.net", "555-0102"),
];

/// (title, category, storage type, quantity)
const CATALOG: &[(&str, &str, &str, f64)] = &[
    ("Sourdough loaves", "Bakery", "ambient", 12.0),
    ("Vegetable soup", "Prepared", "refrigerated", 8.0),
    ("Mixed greens", "Produce", "refrigerated", 5.0),
    ("Yogurt cups", "Dairy", "refrigerated", 24.0),
    ("Bagels", "Bakery", "ambient", 18.0),
    ("Pasta trays", "Prepared", "frozen", 6.0),
    ("Apples", "Produce", "ambient", 30.0),
];

/// Load demo data unless the database already has items.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn demo_data(days: u32) -> Result<(), CommandError> {
    if days == 0 {
        return Err(CommandError::InvalidArgument(
            "days must be at least 1".to_string(),
        ));
    }

    let pool = connect().await?;

    let existing: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::warn!(existing, "Items already present, skipping seed");
        return Ok(());
    }

    let users = UserRepository::new(&pool);
    let mut donors = Vec::with_capacity(DONORS.len());
    for (name, email) in DONORS {
        donors.push(users.upsert(name, &parse_email(email)?, None, UserRole::Donor).await?);
    }
    let mut recipients = Vec::with_capacity(RECIPIENTS.len());
    for (name, email, phone) in RECIPIENTS {
        recipients.push(
            users
                .upsert(name, &parse_email(email)?, Some(phone), UserRole::User)
                .await?,
        );
    }
    tracing::info!(donors = donors.len(), recipients = recipients.len(), "Users ready");

    let orgs_repo = OrganizationRepository::new(&pool);
    let mut orgs = Vec::with_capacity(ORGANIZATIONS.len());
    for org in ORGANIZATIONS {
        orgs.push(
            orgs_repo
                .create(&NewOrganization {
                    name: org.name.to_string(),
                    kind: org.kind.to_string(),
                    address: Some(org.address.to_string()),
                    lat: Some(org.lat),
                    lng: Some(org.lng),
                    phone: None,
                    email: org.email.map(str::to_string),
                    capacity: json!({ "fridge": true, "freezer": org.kind != "pantry" }),
                })
                .await?,
        );
    }
    tracing::info!(organizations = orgs.len(), "Organizations created");

    let now = SystemClock.now();
    let (listed, claimed) = seed_items(&pool, now, days, &orgs, &donors, &recipients).await?;

    tracing::info!("Seeding complete!");
    tracing::info!("  Items listed: {listed}");
    tracing::info!("  Items claimed: {claimed}");
    Ok(())
}

async fn seed_items(
    pool: &sqlx::PgPool,
    now: DateTime<Utc>,
    days: u32,
    orgs: &[Organization],
    donors: &[User],
    recipients: &[User],
) -> Result<(usize, usize), CommandError> {
    let items = ItemRepository::new(pool);
    let (mut listed, mut claimed) = (0, 0);

    let mut catalog = CATALOG.iter().cycle();
    let mut org_cycle = orgs.iter().cycle();
    let mut donor_cycle = donors.iter().cycle();
    let mut recipient_cycle = recipients.iter().cycle();

    for i in 0..days * 2 {
        let (Some(&(title, category, storage, quantity)), Some(org), Some(donor)) =
            (catalog.next(), org_cycle.next(), donor_cycle.next())
        else {
            break;
        };
        let ready_at = now
            - TimeDelta::days(i64::from(i / 2))
            - TimeDelta::hours(i64::from(7 + (i * 5) % 12));
        let expires_at = ready_at + TimeDelta::hours(i64::from(18 + (i % 4) * 12));

        let new = NewItem {
            org_id: org.id,
            title: title.to_string(),
            description: Some(format!("{title} from {}", org.name)),
            category: Some(category.to_string()),
            allergens: allergens_for(category),
            storage_type: Some(storage.to_string()),
            quantity: Some(quantity),
            ready_at: Some(ready_at),
            expires_at: Some(expires_at),
            pickup_window: Some("4pm - 7pm".to_string()),
            status: ItemStatus::Listed,
            photo_url: None,
            donated_by_user_id: Some(donor.id),
        };
        let item = items.create(&new).await?;
        listed += 1;

        // Past items are claimed two times in three
        if expires_at < now
            && i % 3 != 0
            && let Some(recipient) = recipient_cycle.next()
        {
            let claim = ItemClaim {
                claimer_name: recipient.name.clone(),
                claimer_phone: recipient.phone.clone(),
                claimer_email: Some(recipient.email.as_str().to_string()),
                user_id: Some(recipient.id),
            };
            let claimed_at = ready_at + TimeDelta::hours(i64::from(1 + i % 5));
            items.claim(item.id, &claim, claimed_at).await?;
            claimed += 1;
        }
    }

    Ok((listed, claimed))
}

fn allergens_for(category: &str) -> Vec<String> {
    match category {
        "Bakery" => vec!["gluten".to_string()],
        "Dairy" => vec!["milk".to_string()],
        "Prepared" => vec!["gluten".to_string(), "celery".to_string()],
        _ => Vec::new(),
    }
}

fn parse_email(raw: &str) -> Result<Email, CommandError> {
    Email::parse(raw).map_err(|e| CommandError::InvalidArgument(format!("{raw}: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_emails_parse() {
        for (_, email) in DONORS {
            assert!(parse_email(email).is_ok(), "{email}");
        }
        for (_, email, _) in RECIPIENTS {
            assert!(parse_email(email).is_ok(), "{email}");
        }
    }

    #[test]
    fn test_demo_organizations_validate() {
        for org in ORGANIZATIONS {
            let new = NewOrganization {
                name: org.name.to_string(),
                kind: org.kind.to_string(),
                address: Some(org.address.to_string()),
                lat: Some(org.lat),
                lng: Some(org.lng),
                phone: None,
                email: org.email.map(str::to_string),
                capacity: json!({}),
            };
            assert!(new.validate().is_ok(), "{}", org.name);
        }
    }

    #[test]
    fn test_allergens_by_category() {
        assert_eq!(allergens_for("Dairy"), vec!["milk".to_string()]);
        assert!(allergens_for("Produce").is_empty());
    }
}
