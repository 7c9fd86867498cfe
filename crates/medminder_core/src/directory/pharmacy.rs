//! Bundled pharmacy directory.
//!
//! The directory is a fixed catalog; there is no geolocation lookup.
//! "Nearest" ordering uses the precomputed `distance_km`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pharmacy {
    pub id: &'static str,
    pub name: &'static str,
    pub address: &'static str,
    pub distance_km: f64,
    pub phone: &'static str,
    pub hours: &'static str,
}

const fn pharmacy(
    id: &'static str,
    name: &'static str,
    address: &'static str,
    distance_km: f64,
    phone: &'static str,
    hours: &'static str,
) -> Pharmacy {
    Pharmacy {
        id,
        name,
        address,
        distance_km,
        phone,
        hours,
    }
}

static CATALOG: [Pharmacy; 15] = [
    pharmacy("1", "MedPlus Pharmacy", "FC Road, Shivajinagar, Pune, Maharashtra 411005", 0.8, "+91 20 2553 6789", "Open until 10PM"),
    pharmacy("2", "Apollo Pharmacy", "Aundh Road, Pune, Maharashtra 411007", 1.2, "+91 20 2588 4567", "Open until 11PM"),
    pharmacy("3", "Wellness Forever", "Koregaon Park, Pune, Maharashtra 411001", 2.5, "+91 20 2615 7890", "Open until 9PM"),
    pharmacy("4", "Noble Pharmacy", "Viman Nagar, Pune, Maharashtra 411014", 3.1, "+91 20 2668 9012", "Open 24 hours"),
    pharmacy("5", "Medlife Pharmacy", "Baner Road, Pune, Maharashtra 411045", 3.7, "+91 20 2567 3456", "Open until 9PM"),
    pharmacy("6", "LifeCare Pharmacy", "Hadapsar, Pune, Maharashtra 411028", 4.2, "+91 20 2689 7654", "Open until 10PM"),
    pharmacy("7", "Sahyadri Medical Store", "Sinhagad Road, Pune, Maharashtra 411041", 4.6, "+91 20 2565 4321", "Open until 9:30PM"),
    pharmacy("8", "MK Pharmacy", "Kothrud, Pune, Maharashtra 411038", 5.0, "+91 20 2546 8765", "Open until 10PM"),
    pharmacy("9", "Poona Pharmacy", "Camp Area, Pune, Maharashtra 411001", 1.5, "+91 20 2612 3456", "Open until 8:30PM"),
    pharmacy("10", "Wellness Plus Pharmacy", "NIBM Road, Pune, Maharashtra 411048", 6.2, "+91 20 2689 0123", "Open until 9PM"),
    pharmacy("11", "Pulse Pharmacy", "Kalyani Nagar, Pune, Maharashtra 411006", 3.8, "+91 20 2665 7890", "Open until 11PM"),
    pharmacy("12", "Deccan Chemist", "Deccan Gymkhana, Pune, Maharashtra 411004", 1.9, "+91 20 2567 8901", "Open until 10:30PM"),
    pharmacy("13", "Care Pharmacy", "Wakad, Pune, Maharashtra 411057", 8.5, "+91 20 2703 4567", "Open until 9PM"),
    pharmacy("14", "Medicore Pharmacy", "Hinjewadi, Pune, Maharashtra 411057", 9.7, "+91 20 2712 6789", "Open 24 hours"),
    pharmacy("15", "Sanjeevani Medical", "Kharadi, Pune, Maharashtra 411014", 7.3, "+91 20 2678 9012", "Open until 10PM"),
];

pub fn all() -> &'static [Pharmacy] {
    &CATALOG
}

/// Case-insensitive substring match on name or address.
///
/// A blank query returns the whole catalog in catalog order.
pub fn search(query: &str) -> Vec<&'static Pharmacy> {
    let needle = query.trim().to_lowercase();
    CATALOG
        .iter()
        .filter(|pharmacy| {
            needle.is_empty()
                || pharmacy.name.to_lowercase().contains(&needle)
                || pharmacy.address.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Whole catalog sorted by distance, nearest first.
pub fn nearest() -> Vec<&'static Pharmacy> {
    let mut sorted = CATALOG.iter().collect::<Vec<_>>();
    sorted.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    sorted
}
