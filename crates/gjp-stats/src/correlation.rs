/// Pearson correlation between two paired series.
///
/// The coefficient is computed over complete pairs only; callers are expected
/// to drop pairs where either side is missing before handing them over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    /// Pearson correlation coefficient in `[-1, 1]`, or `NaN` when undefined.
    pub coefficient: f64,
    /// Number of pairs that contributed to the coefficient.
    pub n: usize,
}

impl Correlation {
    /// Computes the Pearson correlation coefficient of paired samples.
    ///
    /// The coefficient is undefined (`NaN`) when fewer than two pairs are
    /// given or when either series has zero variance.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gjp_stats::correlation::Correlation;
    /// let corr = Correlation::pearson([(0.1, 0.2), (0.5, 0.6), (0.9, 1.0)]);
    /// assert!((corr.coefficient - 1.0).abs() < 1e-12);
    /// assert_eq!(corr.n, 3);
    ///
    /// let flat = Correlation::pearson([(0.5, 0.1), (0.5, 0.9)]);
    /// assert!(flat.coefficient.is_nan());
    /// ```
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn pearson<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let pairs = pairs.into_iter().collect::<Vec<_>>();
        let n = pairs.len();
        if n < 2 {
            return Self {
                coefficient: f64::NAN,
                n,
            };
        }

        let len = n as f64;
        let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / len;
        let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / len;

        let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
        for (x, y) in &pairs {
            let dx = x - mean_x;
            let dy = y - mean_y;
            sxy += dx * dy;
            sxx += dx * dx;
            syy += dy * dy;
        }

        let coefficient = if sxx <= 0.0 || syy <= 0.0 {
            f64::NAN
        } else {
            (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
        };
        Self { coefficient, n }
    }

    /// Returns `true` if the coefficient is a finite number.
    #[must_use]
    pub fn is_defined(&self) -> bool {
        self.coefficient.is_finite()
    }

    /// Squared coefficient, used for ranking the strength of a relationship
    /// regardless of its direction.
    #[must_use]
    pub fn r_squared(&self) -> f64 {
        self.coefficient * self.coefficient
    }
}
