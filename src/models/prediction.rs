use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PredictionTier {
    Excelente,
    Bueno,
    Regular,
    Bajo,
}

impl PredictionTier {
    pub fn from_score(score: u8) -> Self {
        match score {
            85..=u8::MAX => PredictionTier::Excelente,
            70..=84 => PredictionTier::Bueno,
            50..=69 => PredictionTier::Regular,
            _ => PredictionTier::Bajo,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PredictionTier::Excelente => "Excelente",
            PredictionTier::Bueno => "Bueno",
            PredictionTier::Regular => "Regular",
            PredictionTier::Bajo => "Bajo",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            PredictionTier::Excelente => "#22c55e",
            PredictionTier::Bueno => "#84cc16",
            PredictionTier::Regular => "#eab308",
            PredictionTier::Bajo => "#ef4444",
        }
    }

    pub fn emoji(self) -> &'static str {
        match self {
            PredictionTier::Excelente => "🟢",
            PredictionTier::Bueno => "🟡",
            PredictionTier::Regular => "🟠",
            PredictionTier::Bajo => "🔴",
        }
    }

    pub fn recomendacion(self) -> &'static str {
        match self {
            PredictionTier::Excelente => "Óptimo para asignar nuevos proyectos",
            PredictionTier::Bueno => "Puede recibir tareas con moderación",
            PredictionTier::Regular => "Tiene carga pendiente, asignar con cuidado",
            PredictionTier::Bajo => "No recomendado para nuevas asignaciones",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Mejorando,
    Empeorando,
    Estable,
    SinDatos,
}

impl Trend {
    pub fn adjustment(self) -> i32 {
        match self {
            Trend::Mejorando => 5,
            Trend::Empeorando => -10,
            Trend::Estable | Trend::SinDatos => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Trend::Mejorando => "mejorando",
            Trend::Empeorando => "empeorando",
            Trend::Estable => "estable",
            Trend::SinDatos => "sin_datos",
        }
    }

    pub fn descripcion(self) -> &'static str {
        match self {
            Trend::Mejorando => "Tendencia positiva",
            Trend::Empeorando => "Tendencia negativa",
            Trend::Estable => "Tendencia estable",
            Trend::SinDatos => "Datos insuficientes",
        }
    }
}

/// Completed and pending counts for one day of a collaborator's history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayCounts {
    pub terminadas: u64,
    pub pendientes: u64,
}

/// Everything the score formula reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreInputs {
    pub pending: u64,
    /// Pending tasks open for two days or more.
    pub carried_over: u64,
    pub average_carry_over_days: f64,
    pub completed: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreFactors {
    pub pendientes: u64,
    pub con_arrastre: u64,
    pub dias_promedio_arrastre: f64,
    pub terminadas_semana: u64,
    pub bonificacion: u64,
    pub ajuste_tendencia: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionScore {
    pub score: u8,
    pub nivel: PredictionTier,
    pub color: String,
    pub emoji: String,
    pub recomendacion: String,
    pub tendencia: Trend,
    pub factores: ScoreFactors,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTask {
    pub id: String,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_creacion: Option<String>,
    pub dias_arrastre: u32,
    pub actividad: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTask {
    pub id: String,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_creacion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha_fin_terminada: Option<String>,
    pub dias_para_completar: u32,
    pub actividad: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollaboratorMetrics {
    pub total_terminadas: u64,
    pub total_confirmadas: u64,
    pub total_pendientes: u64,
    pub tareas_pendientes: Vec<PendingTask>,
    pub tareas_terminadas: Vec<CompletedTask>,
    pub dias_arrastre_promedio: f64,
    pub tareas_con_arrastre: u64,
}

impl CollaboratorMetrics {
    pub fn score_inputs(&self) -> ScoreInputs {
        ScoreInputs {
            pending: self.total_pendientes,
            carried_over: self.tareas_con_arrastre,
            average_carry_over_days: self.dias_arrastre_promedio,
            completed: self.total_terminadas,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollaboratorPrediction {
    pub id: String,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub metricas: CollaboratorMetrics,
    pub prediccion: PredictionScore,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub desde: String,
    pub hasta: String,
    pub fecha_analisis: String,
    pub total_revisiones: u64,
    /// Days whose revisiones request failed while building trends.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dias_fallidos: Vec<String>,
    pub colaboradores: Vec<CollaboratorPrediction>,
}
