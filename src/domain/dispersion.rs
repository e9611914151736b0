// Dispersion measures over serving vectors

use super::errors::EvaluationError;
use super::value_objects::TOLERANCE;

/// Population coefficient of variation (standard deviation over mean).
///
/// The mean is guarded: an empty vector, or one whose mean lies within
/// [`TOLERANCE`] of zero, yields [`EvaluationError::UndefinedDispersion`].
pub fn coefficient_of_variation(values: &[f64]) -> Result<f64, EvaluationError> {
    if values.is_empty() {
        return Err(EvaluationError::UndefinedDispersion);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    if !mean.is_finite() {
        return Err(EvaluationError::NonFiniteValue("mean".to_string()));
    }
    if mean.abs() <= TOLERANCE {
        return Err(EvaluationError::UndefinedDispersion);
    }
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Ok(variance.sqrt() / mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn uniform_vector_has_no_dispersion() {
        let cv = coefficient_of_variation(&[2.0, 2.0, 2.0]).unwrap();
        assert_relative_eq!(cv, 0.0);
    }

    #[test]
    fn uses_population_standard_deviation() {
        // mean 2.5, population variance 1.25
        let cv = coefficient_of_variation(&[1.0, 2.0, 3.0, 4.0]).unwrap();
        assert_relative_eq!(cv, 1.25_f64.sqrt() / 2.5, epsilon = 1e-12);
    }

    #[test]
    fn zero_vector_is_undefined() {
        assert_eq!(
            coefficient_of_variation(&[0.0; 11]),
            Err(EvaluationError::UndefinedDispersion)
        );
    }

    #[test]
    fn empty_vector_is_undefined() {
        assert_eq!(
            coefficient_of_variation(&[]),
            Err(EvaluationError::UndefinedDispersion)
        );
    }

    #[test]
    fn tiny_mean_is_undefined() {
        assert_eq!(
            coefficient_of_variation(&[1e-10, 0.0]),
            Err(EvaluationError::UndefinedDispersion)
        );
    }
}
