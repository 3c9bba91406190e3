//! Shared utilities for integration testing.
//!
//! Provisions throwaway SQLite stores with the production schema and a
//! couple of employees, then spawns the real HTTP server on an ephemeral
//! port. Each test gets its own stores, so tests never observe each
//! other's audit rows.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sqlx::sqlite::SqlitePool;
use tokio::net::TcpListener;
use uuid::Uuid;

use attrition_api::config::AppConfig;
use attrition_api::http::{AppState, HttpServer};
use attrition_api::lifecycle::Shutdown;
use attrition_api::model::{AttritionModel, RealModel, StubModel};
use attrition_api::predict::PredictionService;
use attrition_api::store::{AuditLogger, Db};

const FEATURE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS raw (
    id_employee INTEGER,
    age INTEGER,
    revenu_mensuel INTEGER,
    nombre_experiences_precedentes INTEGER,
    annee_experience_totale INTEGER,
    annees_dans_l_entreprise INTEGER,
    annees_dans_le_poste_actuel INTEGER,
    satisfaction_employee_environnement INTEGER,
    note_evaluation_actuelle INTEGER,
    note_evaluation_precedente INTEGER,
    niveau_hierarchique_poste INTEGER,
    satisfaction_employee_nature_travail INTEGER,
    satisfaction_employee_equipe INTEGER,
    satisfaction_employee_equilibre_pro_perso INTEGER,
    nombre_participation_pee INTEGER,
    nb_formations_suivies INTEGER,
    distance_domicile_travail INTEGER,
    niveau_education INTEGER,
    annees_depuis_la_derniere_promotion INTEGER,
    annes_sous_responsable_actuel INTEGER,
    augmentation_salaire_precedente INTEGER,
    score_evolution_carriere REAL,
    indice_evolution_salaire REAL,
    frequence_deplacement TEXT,
    salaire_cat TEXT,
    salaire_cat_eq TEXT,
    position_salaire_poste TEXT,
    position_salaire_poste_anc TEXT,
    score_carriere_cat TEXT,
    indice_evol_cat TEXT,
    statut_marital TEXT,
    domaine_etude TEXT,
    poste_departement TEXT,
    genre TEXT,
    heure_supplementaires TEXT,
    nouveau_responsable TEXT,
    attrition_num INTEGER
);

INSERT INTO raw VALUES
(
    1, 30, 3000, 3, 7, 5, 2, 4, 5, 3, 1, 3, 4, 4, 1, 1, 10, 2, 1, 2, 1, 0.5, 0.1,
    'Rare', 'Bas', 'Bas', 'Bas', 'Moyen', 'Moyen', 'Bas', 'Marié', 'Sciences', 'IT',
    'H', 'Non', 'Non', 0
),
(
    2, 40, 4500, 5, 15, 10, 4, 5, 6, 5, 2, 4, 5, 4, 2, 2, 20, 4, 5, 4, 2, 0.7, 0.2,
    'Régulier', 'Moyen', 'Moyen', 'Haut', 'Haut', 'Haut', 'Haut', 'Célibataire', 'Eco',
    'HR', 'F', 'Oui', 'Oui', 1
);
"#;

const AUDIT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS model_input (
    input_id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    payload TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS model_output (
    output_id INTEGER PRIMARY KEY AUTOINCREMENT,
    input_id INTEGER,
    timestamp TEXT NOT NULL,
    prediction TEXT NOT NULL,
    model_version TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS api_log (
    log_id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp TEXT NOT NULL,
    event_type TEXT NOT NULL,
    request_payload TEXT,
    response_payload TEXT,
    http_code INTEGER NOT NULL,
    user_id TEXT,
    duration_ms INTEGER NOT NULL,
    error_detail TEXT
);
"#;

/// Pre-existing audit rows, mirroring what an earlier deployment wrote.
const AUDIT_FIXTURES: &str = r#"
INSERT INTO model_input (input_id, timestamp, payload) VALUES
(101, '2025-11-25 14:22:00', '{"id_employee": 1, "age": 30}'),
(102, '2025-11-25 14:25:01', '{"id_employee": 2, "age": 40}');

INSERT INTO model_output (output_id, input_id, timestamp, prediction, model_version) VALUES
(201, 101, '2025-11-25 14:24:18', '{"prediction": "OUI"}', '1.0'),
(202, 102, '2025-11-25 14:26:38', '{"prediction": "NON"}', '1.0');

INSERT INTO api_log (log_id, timestamp, event_type, request_payload, response_payload,
    http_code, user_id, duration_ms, error_detail) VALUES
(301, '2025-11-25 14:27:10', 'predict', '{"id_employee": 1}', '{"prediction": "OUI"}', 200, 'user1', 222, NULL),
(302, '2025-11-25 14:28:01', 'predict', '{"id_employee": 2}', '{"prediction": "NON"}', 200, 'user2', 240, NULL);
"#;

#[derive(Debug, Clone, Copy, Default)]
pub struct TestOptions {
    /// Deploy in read-only ("demo") mode.
    pub read_only: bool,
    /// Use the stub model instead of the shipped artifact.
    pub stub_model: bool,
    /// Point the audit logger at an unreachable store.
    pub break_audit: bool,
    /// Seed the audit tables with historical rows.
    pub audit_fixtures: bool,
}

pub struct TestApp {
    pub addr: SocketAddr,
    /// Direct handle on the audit store for row-count assertions; absent
    /// when the audit store was deliberately broken.
    pub audit_pool: Option<SqlitePool>,
    #[allow(dead_code)]
    shutdown: Shutdown,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    #[allow(dead_code)]
    pub async fn audit_count(&self, table: &str) -> i64 {
        let pool = self.audit_pool.as_ref().expect("audit store not provisioned");
        sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(pool)
            .await
            .unwrap()
    }
}

/// Provision stores, build state, and spawn the server.
pub async fn spawn_app(options: TestOptions) -> TestApp {
    let dir = test_dir();
    let feature_url = format!("sqlite:{}?mode=rwc", dir.join("features.db").display());
    let audit_url = if options.break_audit {
        // A directory that does not exist and no rwc mode: connect fails.
        "sqlite:/attrition-no-such-dir/audit.db".to_string()
    } else {
        format!("sqlite:{}?mode=rwc", dir.join("audit.db").display())
    };

    let feature_pool = SqlitePool::connect(&feature_url).await.unwrap();
    sqlx::raw_sql(FEATURE_SCHEMA).execute(&feature_pool).await.unwrap();

    let audit_pool = if options.break_audit {
        None
    } else {
        let pool = SqlitePool::connect(&audit_url).await.unwrap();
        sqlx::raw_sql(AUDIT_SCHEMA).execute(&pool).await.unwrap();
        if options.audit_fixtures {
            sqlx::raw_sql(AUDIT_FIXTURES).execute(&pool).await.unwrap();
        }
        Some(pool)
    };

    let features = Db::connect(&feature_url).await.unwrap();
    let audit = AuditLogger::connect(&audit_url, options.read_only).await;

    let model: Arc<dyn AttritionModel> = if options.stub_model {
        Arc::new(StubModel)
    } else {
        let artifact = Path::new(env!("CARGO_MANIFEST_DIR")).join("assets/model_artifact.json");
        Arc::new(RealModel::load(&artifact).unwrap())
    };

    let service = Arc::new(PredictionService::new(
        features.clone(),
        audit.clone(),
        model,
        "test_user",
    ));
    let state = AppState {
        service,
        features,
        audit,
        environment: "test".to_string(),
    };

    let config = AppConfig::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();
    let server = HttpServer::new(&config, state);
    let rx = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, rx).await;
    });

    TestApp {
        addr,
        audit_pool,
        shutdown,
    }
}

fn test_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!("attrition-test-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
