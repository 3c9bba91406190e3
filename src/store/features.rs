//! Feature store access.
//!
//! One wide table (`raw`) keyed by `id_employee`, populated offline by the
//! ETL pipeline. This module only ever reads it: a single fetch per
//! prediction, no retries, absence reported as [`StoreError::NotFound`].

use std::collections::BTreeMap;

use serde::Serialize;

use crate::store::db::Db;
use crate::store::StoreError;

/// A scalar feature value as stored in the wide table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl FeatureValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int(v) => Some(*v as f64),
            FeatureValue::Float(v) => Some(*v),
            FeatureValue::Text(_) => None,
        }
    }

    /// Textual view of the value, if it has one.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FeatureValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<&FeatureValue> for serde_json::Value {
    fn from(value: &FeatureValue) -> Self {
        match value {
            FeatureValue::Int(v) => serde_json::Value::from(*v),
            FeatureValue::Float(v) => serde_json::Value::from(*v),
            FeatureValue::Text(v) => serde_json::Value::from(v.clone()),
        }
    }
}

/// One employee's raw feature row, exactly as the ETL wrote it.
///
/// `attrition_num` is the historical outcome label. It rides along for
/// auditing but is excluded from [`EmployeeRow::feature_map`] so it can
/// never reach the model.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EmployeeRow {
    pub id_employee: i64,
    pub age: i64,
    pub revenu_mensuel: i64,
    pub nombre_experiences_precedentes: i64,
    pub annee_experience_totale: i64,
    pub annees_dans_l_entreprise: i64,
    pub annees_dans_le_poste_actuel: i64,
    pub satisfaction_employee_environnement: i64,
    pub note_evaluation_actuelle: i64,
    pub note_evaluation_precedente: i64,
    pub niveau_hierarchique_poste: i64,
    pub satisfaction_employee_nature_travail: i64,
    pub satisfaction_employee_equipe: i64,
    pub satisfaction_employee_equilibre_pro_perso: i64,
    pub nombre_participation_pee: i64,
    pub nb_formations_suivies: i64,
    pub distance_domicile_travail: i64,
    pub niveau_education: i64,
    pub annees_depuis_la_derniere_promotion: i64,
    pub annes_sous_responsable_actuel: i64,
    pub augmentation_salaire_precedente: i64,
    pub score_evolution_carriere: f64,
    pub indice_evolution_salaire: f64,
    pub frequence_deplacement: String,
    pub salaire_cat: String,
    pub salaire_cat_eq: String,
    pub position_salaire_poste: String,
    pub position_salaire_poste_anc: String,
    pub score_carriere_cat: String,
    pub indice_evol_cat: String,
    pub statut_marital: String,
    pub domaine_etude: String,
    pub poste_departement: String,
    pub genre: String,
    pub heure_supplementaires: String,
    pub nouveau_responsable: String,
    pub attrition_num: i64,
}

impl EmployeeRow {
    /// Name → value map of every model-eligible feature.
    ///
    /// Excludes the identifier and the outcome label.
    pub fn feature_map(&self) -> BTreeMap<String, FeatureValue> {
        let mut map = BTreeMap::new();

        macro_rules! int_features {
            ($($field:ident),+ $(,)?) => {
                $( map.insert(stringify!($field).to_string(), FeatureValue::Int(self.$field)); )+
            };
        }
        macro_rules! float_features {
            ($($field:ident),+ $(,)?) => {
                $( map.insert(stringify!($field).to_string(), FeatureValue::Float(self.$field)); )+
            };
        }
        macro_rules! text_features {
            ($($field:ident),+ $(,)?) => {
                $( map.insert(stringify!($field).to_string(), FeatureValue::Text(self.$field.clone())); )+
            };
        }

        int_features!(
            age,
            revenu_mensuel,
            nombre_experiences_precedentes,
            annee_experience_totale,
            annees_dans_l_entreprise,
            annees_dans_le_poste_actuel,
            satisfaction_employee_environnement,
            note_evaluation_actuelle,
            note_evaluation_precedente,
            niveau_hierarchique_poste,
            satisfaction_employee_nature_travail,
            satisfaction_employee_equipe,
            satisfaction_employee_equilibre_pro_perso,
            nombre_participation_pee,
            nb_formations_suivies,
            distance_domicile_travail,
            niveau_education,
            annees_depuis_la_derniere_promotion,
            annes_sous_responsable_actuel,
            augmentation_salaire_precedente,
        );
        float_features!(score_evolution_carriere, indice_evolution_salaire);
        text_features!(
            frequence_deplacement,
            salaire_cat,
            salaire_cat_eq,
            position_salaire_poste,
            position_salaire_poste_anc,
            score_carriere_cat,
            indice_evol_cat,
            statut_marital,
            domaine_etude,
            poste_departement,
            genre,
            heure_supplementaires,
            nouveau_responsable,
        );

        map
    }

    /// Raw values for the response body (`donnees_brutes`), same key set
    /// as [`EmployeeRow::feature_map`].
    pub fn raw_values(&self) -> serde_json::Map<String, serde_json::Value> {
        self.feature_map()
            .iter()
            .map(|(name, value)| (name.clone(), value.into()))
            .collect()
    }
}

impl Db {
    /// Fetch one employee's feature row. Single attempt, read-only.
    pub async fn fetch_employee(&self, id_employee: i64) -> Result<EmployeeRow, StoreError> {
        const SQL: &str = "SELECT * FROM raw WHERE id_employee = $1";
        let row = match self {
            Db::Sqlite(pool) => {
                sqlx::query_as::<_, EmployeeRow>(SQL)
                    .bind(id_employee)
                    .fetch_optional(pool)
                    .await?
            }
            Db::Postgres(pool) => {
                sqlx::query_as::<_, EmployeeRow>(SQL)
                    .bind(id_employee)
                    .fetch_optional(pool)
                    .await?
            }
        };
        row.ok_or(StoreError::NotFound(id_employee))
    }

    /// Distinct known employee identifiers, ascending.
    pub async fn list_employee_ids(&self) -> Result<Vec<i64>, StoreError> {
        const SQL: &str = "SELECT DISTINCT id_employee FROM raw ORDER BY id_employee";
        let ids = match self {
            Db::Sqlite(pool) => sqlx::query_scalar::<_, i64>(SQL).fetch_all(pool).await?,
            Db::Postgres(pool) => sqlx::query_scalar::<_, i64>(SQL).fetch_all(pool).await?,
        };
        Ok(ids)
    }
}
