use std::ops::Range;

/// A histogram representation of a dataset's distribution.
///
/// The histogram divides a fixed domain into equal-width bins and counts the
/// values falling into each bin. Values outside the domain are not counted but
/// are reported in [`Histogram::out_of_range`].
#[derive(Debug, Clone)]
pub struct Histogram {
    /// The bins comprising the histogram, ordered by range.
    pub bins: Vec<HistogramBin>,
    /// Number of values that fell outside the histogram domain.
    pub out_of_range: u64,
}

/// A single bin in a histogram.
///
/// Each bin represents a range of values and the count of data points falling within that range.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    /// The range of values covered by this bin (inclusive start, exclusive end).
    ///
    /// The last bin also includes its end so that the domain maximum is counted.
    pub range: Range<f64>,
    /// The number of values that fall within this bin's range.
    pub count: u64,
}

impl Histogram {
    /// Creates a histogram with `num_bins` equal-width bins spanning `domain`.
    ///
    /// Probabilities are binned over `0.0..1.0`, in which case a value of
    /// exactly `1.0` is counted in the last bin.
    ///
    /// # Arguments
    ///
    /// * `values` - The data points to create the histogram from.
    /// * `num_bins` - The number of bins to create.
    /// * `domain` - The range covered by the bins.
    ///
    /// # Returns
    ///
    /// A `Histogram` with bins populated based on the input values. An empty
    /// histogram is returned when `num_bins` is zero or the domain is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// # use gjp_stats::histogram::Histogram;
    /// let histogram = Histogram::with_domain([0.05, 0.1, 0.55, 1.0], 4, 0.0..1.0);
    /// let counts = histogram.bins.iter().map(|b| b.count).collect::<Vec<_>>();
    /// assert_eq!(counts, [2, 0, 1, 1]);
    /// ```
    #[expect(
        clippy::cast_precision_loss,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    #[must_use]
    pub fn with_domain<I>(values: I, num_bins: usize, domain: Range<f64>) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        if num_bins == 0 || domain.is_empty() {
            return Self {
                bins: vec![],
                out_of_range: 0,
            };
        }

        let width = (domain.end - domain.start) / num_bins as f64;
        let mut bins = (0..num_bins)
            .map(|idx| HistogramBin {
                // Recompute bounds from the index to avoid accumulating rounding errors
                range: domain.start + width * idx as f64
                    ..domain.start + width * (idx + 1) as f64,
                count: 0,
            })
            .collect::<Vec<_>>();
        if let Some(last) = bins.last_mut() {
            last.range.end = domain.end;
        }

        let mut out_of_range = 0;
        for value in values {
            if !(domain.start..=domain.end).contains(&value) {
                out_of_range += 1;
                continue;
            }
            let idx = (((value - domain.start) / width).floor() as usize).min(num_bins - 1);
            bins[idx].count += 1;
        }

        Self { bins, out_of_range }
    }

    /// Total number of values counted in the bins.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|bin| bin.count).sum()
    }
}
