//! User-facing text for a prediction.
//!
//! Both helpers are pure. Callers with their own localisation pass a
//! [`Translate`] implementation; without one the text is the built-in
//! Portuguese.

use crate::api::{Prediction, PredictionResult};

/// Looks up a localised string by key, interpolating named arguments.
pub trait Translate {
    fn translate(&self, key: &str, args: &[(&str, &str)]) -> String;
}

impl<F> Translate for F
where
    F: Fn(&str, &[(&str, &str)]) -> String,
{
    fn translate(&self, key: &str, args: &[(&str, &str)]) -> String {
        self(key, args)
    }
}

/// Confidence as a percentage with one decimal place, without the `%` sign.
pub fn format_confidence(confidence: f64) -> String {
    format!("{:.1}", confidence * 100.0)
}

/// Status line for a result, e.g. `Catarata detectada (confiança: 87.5%)`.
///
/// The translator receives `result.normal` or `result.cataract` with the
/// argument `confidence`.
pub fn prediction_message(result: &PredictionResult, translator: Option<&dyn Translate>) -> String {
    let confidence = format_confidence(result.confidence);
    let key = format!("result.{}", result.prediction.key());

    match translator {
        Some(t) => t.translate(&key, &[("confidence", confidence.as_str())]),
        None => match result.prediction {
            Prediction::Normal => format!(
                "Nenhum sinal de catarata detectado (confiança: {}%)",
                confidence
            ),
            Prediction::Cataract => format!("Catarata detectada (confiança: {}%)", confidence),
        },
    }
}

/// Advice to show next to the status line.
pub fn recommendation(result: &PredictionResult, translator: Option<&dyn Translate>) -> String {
    let key = format!("recommendation.{}", result.prediction.key());

    match translator {
        Some(t) => t.translate(&key, &[]),
        None => match result.prediction {
            Prediction::Normal => {
                "Seus olhos parecem saudáveis. Continue fazendo exames oftalmológicos regulares."
                    .to_string()
            }
            Prediction::Cataract => {
                "Recomendamos consultar um oftalmologista para uma avaliação completa.".to_string()
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(prediction: Prediction, confidence: f64) -> PredictionResult {
        PredictionResult {
            prediction,
            confidence,
            class_index: match prediction {
                Prediction::Normal => 0,
                Prediction::Cataract => 1,
            },
            message: String::new(),
        }
    }

    #[test]
    fn test_format_confidence() {
        assert_eq!(format_confidence(0.8731), "87.3");
        assert_eq!(format_confidence(1.0), "100.0");
        assert_eq!(format_confidence(0.0), "0.0");
        assert_eq!(format_confidence(0.5), "50.0");
    }

    #[test]
    fn test_default_messages_are_portuguese() {
        let msg = prediction_message(&result(Prediction::Cataract, 0.875), None);
        assert_eq!(msg, "Catarata detectada (confiança: 87.5%)");

        let msg = prediction_message(&result(Prediction::Normal, 0.9231), None);
        assert_eq!(msg, "Nenhum sinal de catarata detectado (confiança: 92.3%)");
    }

    #[test]
    fn test_message_always_contains_one_decimal_percentage() {
        for prediction in [Prediction::Normal, Prediction::Cataract] {
            for step in 0..=1000 {
                let confidence = step as f64 / 1000.0;
                let msg = prediction_message(&result(prediction, confidence), None);
                let expected = format!("{:.1}%", confidence * 100.0);
                assert!(msg.contains(&expected), "{} missing {}", msg, expected);
            }
        }
    }

    #[test]
    fn test_default_recommendations() {
        let rec = recommendation(&result(Prediction::Cataract, 0.9), None);
        assert!(rec.contains("oftalmologista"));

        let rec = recommendation(&result(Prediction::Normal, 0.9), None);
        assert!(rec.contains("exames oftalmológicos regulares"));
    }

    #[test]
    fn test_translator_receives_key_and_confidence() {
        let t = |key: &str, args: &[(&str, &str)]| {
            let rendered: Vec<String> = args.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{}[{}]", key, rendered.join(","))
        };

        let msg = prediction_message(&result(Prediction::Cataract, 0.875), Some(&t));
        assert_eq!(msg, "result.cataract[confidence=87.5]");

        let rec = recommendation(&result(Prediction::Normal, 0.1), Some(&t));
        assert_eq!(rec, "recommendation.normal[]");
    }

    #[test]
    fn test_english_translator() {
        let english = |key: &str, args: &[(&str, &str)]| {
            let confidence = args
                .iter()
                .find(|(k, _)| *k == "confidence")
                .map(|(_, v)| *v)
                .unwrap_or_default();
            match key {
                "result.normal" => format!("No signs of cataract ({}% confidence)", confidence),
                "result.cataract" => format!("Cataract detected ({}% confidence)", confidence),
                "recommendation.cataract" => "See an ophthalmologist.".to_string(),
                _ => "Keep up regular eye exams.".to_string(),
            }
        };

        let r = result(Prediction::Cataract, 0.66);
        assert_eq!(
            prediction_message(&r, Some(&english)),
            "Cataract detected (66.0% confidence)"
        );
        assert_eq!(recommendation(&r, Some(&english)), "See an ophthalmologist.");
    }
}
