//! Seed script for a fresh rental backend
//!
//! Logs in as the administrator and creates demo towers, units and amenities
//! through the regular API client. Uses a throwaway session store so an
//! existing console login is left untouched.
//! Run: cargo run --bin seed_demo
//! Credentials: ESTATE_SEED_EMAIL / ESTATE_SEED_PASSWORD (default admin@rental.com / admin123)

use futures::future::try_join_all;

use estate_console::console::AppContext;
use estate_console::drafts::{AmenityDraft, TowerDraft, UnitDraft};
use estate_console::logging::init_logging;
use estate_console::models::{Credentials, UnitStatus};
use estate_console::storage::Storage;
use estate_console::{AppProfile, ClientConfig};

struct DemoUnit {
    number: &'static str,
    floor: i32,
    bedrooms: i32,
    bathrooms: i32,
    size_sqft: i32,
    rent: f64,
    status: UnitStatus,
    description: &'static str,
}

fn unit(
    number: &'static str,
    floor: i32,
    bedrooms: i32,
    bathrooms: i32,
    size_sqft: i32,
    rent: f64,
    description: &'static str,
) -> DemoUnit {
    DemoUnit {
        number,
        floor,
        bedrooms,
        bathrooms,
        size_sqft,
        rent,
        status: UnitStatus::Available,
        description,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env();
    let _log_guard = init_logging(&config.logging)?;

    let email = std::env::var("ESTATE_SEED_EMAIL").unwrap_or_else(|_| "admin@rental.com".into());
    let password = std::env::var("ESTATE_SEED_PASSWORD").unwrap_or_else(|_| "admin123".into());

    let storage = Storage::temporary(AppProfile::Admin.namespace())?;
    let mut ctx = AppContext::with_storage(AppProfile::Admin, config, storage);
    ctx.login(&Credentials::new(email, password)).await?;
    println!("Logged in to {}", ctx.api.base_url());

    let towers = [
        ("Tower A", "123 Main Street, Downtown", 15, "Modern residential tower with city views"),
        ("Tower B", "456 Park Avenue, Midtown", 20, "Luxury apartments with premium amenities"),
        ("Tower C", "789 Lake Drive, Waterfront", 12, "Waterfront living with stunning lake views"),
    ];
    for (name, address, floors, description) in towers {
        ctx.api
            .create_tower(&TowerDraft {
                name: name.to_string(),
                address: address.to_string(),
                total_floors: Some(floors),
                description: Some(description.to_string()),
            })
            .await?;
    }
    let created = ctx.api.list_towers().await?;
    println!("Towers: {}", created.len());

    let mut penthouse = unit("501", 5, 3, 2, 1250, 2400.0, "Premium 3-bedroom with city views");
    penthouse.status = UnitStatus::Occupied;
    let plan: [(&str, Vec<DemoUnit>); 3] = [
        (
            "Tower A",
            vec![
                unit("101", 1, 1, 1, 650, 1200.0, "Cozy studio apartment on ground floor"),
                unit("201", 2, 2, 1, 850, 1500.0, "Spacious 2-bedroom apartment"),
                unit("301", 3, 2, 2, 950, 1800.0, "Modern 2-bed, 2-bath with balcony"),
                unit("401", 4, 3, 2, 1200, 2200.0, "Large 3-bedroom family apartment"),
                penthouse,
            ],
        ),
        (
            "Tower B",
            vec![
                unit("1001", 10, 2, 2, 1000, 2000.0, "Luxury 2-bedroom with modern finishes"),
                unit("1101", 11, 3, 2, 1400, 2800.0, "Penthouse-style 3-bedroom"),
                unit("1201", 12, 4, 3, 1800, 3500.0, "Luxury 4-bedroom penthouse"),
            ],
        ),
        (
            "Tower C",
            vec![
                unit("201", 2, 2, 1, 900, 1700.0, "Waterfront 2-bedroom with lake view"),
                unit("301", 3, 2, 2, 1000, 1900.0, "Premium waterfront apartment"),
                unit("401", 4, 3, 2, 1300, 2500.0, "Spacious 3-bedroom with panoramic views"),
            ],
        ),
    ];

    let mut drafts = Vec::new();
    for (tower_name, units) in plan {
        // the backend may already hold towers of the same name; take the newest
        let Some(tower) = created.iter().filter(|t| t.name == tower_name).max_by_key(|t| t.id) else {
            eprintln!("warning: {tower_name} missing after create, skipping its units");
            continue;
        };
        drafts.extend(units.into_iter().map(|u| UnitDraft {
            tower_id: Some(tower.id),
            unit_number: u.number.to_string(),
            floor: Some(u.floor),
            bedrooms: Some(u.bedrooms),
            bathrooms: Some(u.bathrooms),
            size_sqft: Some(u.size_sqft),
            rent_amount: Some(u.rent),
            status: u.status,
            description: Some(u.description.to_string()),
        }));
    }
    try_join_all(drafts.iter().map(|draft| ctx.api.create_unit(draft))).await?;
    println!("Units: {}", drafts.len());

    let amenities = [
        ("Swimming Pool", "Olympic-size heated swimming pool", "6:00 AM - 10:00 PM"),
        ("Fitness Center", "Fully equipped gym with modern equipment", "24/7"),
        ("Parking Garage", "Secure underground parking", "24/7"),
        ("Clubhouse", "Community clubhouse for events", "8:00 AM - 11:00 PM"),
        ("Children's Playground", "Safe outdoor play area for kids", "7:00 AM - 9:00 PM"),
        ("Business Center", "Co-working space with high-speed internet", "24/7"),
    ]
    .map(|(name, description, hours)| AmenityDraft {
        name: name.to_string(),
        description: Some(description.to_string()),
        availability_hours: Some(hours.to_string()),
        is_active: true,
    });
    try_join_all(amenities.iter().map(|draft| ctx.api.create_amenity(draft))).await?;
    println!("Amenities: {}", amenities.len());

    ctx.logout();
    println!("Demo data loaded.");
    Ok(())
}
