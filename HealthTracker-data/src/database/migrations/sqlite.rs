use rusqlite::{params, Connection};
use tracing::{debug, info};

/// Reference medicines seeded on first start: (name, use case, side effects, precautions)
const SEED_MEDICINES: &[(&str, &str, &str, &str)] = &[
    ("Paracetamol", "Fever, mild to moderate pain", "Nausea, rash (rare), liver damage in overdose", "Do not exceed 4 g per day; avoid with heavy alcohol use"),
    ("Ibuprofen", "Pain, inflammation, fever", "Stomach upset, heartburn, dizziness", "Take after food; avoid with ulcers or kidney disease"),
    ("Azithromycin", "Bacterial infections", "Diarrhoea, nausea, abdominal pain", "Complete the full course; only on prescription"),
    ("Cetirizine", "Allergies, hay fever, itching", "Drowsiness, dry mouth", "Avoid driving if drowsy; limit alcohol"),
    ("Metformin", "Type 2 diabetes", "Nausea, diarrhoea, metallic taste", "Take with meals; monitor kidney function"),
    ("Pantoprazole", "Acidity, GERD, stomach ulcers", "Headache, diarrhoea", "Take before breakfast; long-term use only under advice"),
    ("Aspirin", "Pain, fever, blood thinning", "Stomach irritation, bleeding", "Avoid in children and with bleeding disorders"),
    ("Dolo 650", "Fever, body ache", "Nausea, rash (rare)", "Contains paracetamol; do not combine with other paracetamol products"),
    ("Amoxicillin", "Bacterial infections", "Diarrhoea, rash, nausea", "Check for penicillin allergy; complete the course"),
    ("ORS", "Dehydration from diarrhoea or vomiting", "Rarely bloating", "Prepare with clean water exactly as directed"),
];

/// Reference interaction pairs seeded on first start
const SEED_INTERACTIONS: &[(&str, &str, &str)] = &[
    ("Aspirin", "Ibuprofen", "Both can irritate stomach and increase bleeding risk."),
    ("Aspirin", "Paracetamol", "Occasional combined use is usually safe; long-term combo only under doctor advice."),
    ("Metformin", "Azithromycin", "Generally okay, but sugars may fluctuate; monitor as advised by doctor."),
];

/// Run SQLite migrations
pub fn run_migrations(conn: &Connection) -> Result<(), String> {
    debug!("Running SQLite migrations");

    create_users_table(conn)?;
    create_medications_table(conn)?;
    create_fitness_table(conn)?;
    create_goals_table(conn)?;
    create_symptoms_table(conn)?;
    create_reference_tables(conn)?;
    create_indexes(conn)?;
    seed_reference_data(conn)?;

    debug!("SQLite migrations completed successfully");
    Ok(())
}

fn create_users_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL CHECK (role IN ('patient', 'doctor', 'caregiver')),
            doctor_id INTEGER,
            patient_id INTEGER,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_medications_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS medications (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            med_name TEXT NOT NULL,
            schedule TEXT NOT NULL,
            notes TEXT,
            created_by INTEGER,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_fitness_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS fitness_data (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            bmi REAL NOT NULL DEFAULT 0,
            steps INTEGER NOT NULL DEFAULT 0,
            sleep REAL NOT NULL DEFAULT 0,
            calories INTEGER NOT NULL DEFAULT 0,
            heart_rate INTEGER NOT NULL DEFAULT 0,
            exercise REAL NOT NULL DEFAULT 0,
            bp INTEGER NOT NULL DEFAULT 0,
            date TEXT NOT NULL,
            created_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_goals_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS goals (
            user_id INTEGER PRIMARY KEY,
            steps_goal INTEGER NOT NULL DEFAULT 5000,
            calories_goal INTEGER NOT NULL DEFAULT 2000,
            updated_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_symptoms_table(conn: &Connection) -> Result<(), String> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS symptoms (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL,
            symptom TEXT NOT NULL,
            severity TEXT NOT NULL CHECK (severity IN ('mild', 'moderate', 'severe')),
            recorded_at TEXT NOT NULL
        )",
        [],
    ).map_err(|e| e.to_string())?;

    Ok(())
}

fn create_reference_tables(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS medicines (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            use_case TEXT NOT NULL,
            side_effects TEXT NOT NULL,
            precautions TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS drug_interactions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            med1 TEXT NOT NULL,
            med2 TEXT NOT NULL,
            description TEXT NOT NULL,
            UNIQUE (med1, med2)
        );"
    ).map_err(|e| e.to_string())?;

    Ok(())
}

/// Create indexes used by per-user lookups
fn create_indexes(conn: &Connection) -> Result<(), String> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_medications_user ON medications (user_id);
        CREATE INDEX IF NOT EXISTS idx_fitness_user_date ON fitness_data (user_id, date DESC);
        CREATE INDEX IF NOT EXISTS idx_symptoms_user ON symptoms (user_id);"
    ).map_err(|e| format!("Failed to create index: {}", e))?;

    Ok(())
}

fn seed_reference_data(conn: &Connection) -> Result<(), String> {
    let mut inserted = 0;

    for (name, use_case, side_effects, precautions) in SEED_MEDICINES {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO medicines (name, use_case, side_effects, precautions)
             VALUES (?1, ?2, ?3, ?4)",
            params![name, use_case, side_effects, precautions],
        ).map_err(|e| e.to_string())?;
    }

    for (med1, med2, description) in SEED_INTERACTIONS {
        inserted += conn.execute(
            "INSERT OR IGNORE INTO drug_interactions (med1, med2, description) VALUES (?1, ?2, ?3)",
            params![med1, med2, description],
        ).map_err(|e| e.to_string())?;
    }

    if inserted > 0 {
        info!("Seeded {} reference rows", inserted);
    }

    Ok(())
}
