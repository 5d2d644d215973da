//! # Relaxation time approximation
//!
//! Total scattering rates of the irreducible states, formed from the individual
//! channels by Matthiessen's rule.

use crate::BuildError;
use ndarray::Array2;

#[derive(Clone, Debug, PartialEq)]
/// Scattering rate of every irreducible state, shape `(ibz points, bands)`
pub struct RtaRates {
    rates: Array2<f64>,
}

impl RtaRates {
    /// Sums the channel tables element-wise.
    ///
    /// Every channel must have shape `(number_of_ibz_points, number_of_bands)` and hold
    /// non-negative rates. With no channels at all every rate is zero.
    pub fn matthiessen(
        number_of_ibz_points: usize,
        number_of_bands: usize,
        channels: &[Array2<f64>],
    ) -> Result<Self, BuildError> {
        let shape = (number_of_ibz_points, number_of_bands);
        let mut rates = Array2::zeros(shape);
        for (index, channel) in channels.iter().enumerate() {
            if channel.dim() != shape {
                return Err(BuildError::Shape(format!(
                    "scattering channel {index} has shape {:?}, expected {shape:?}",
                    channel.dim()
                )));
            }
            rates += channel;
        }
        Self::from_rates(rates)
    }

    /// Wraps precomputed total rates
    pub fn from_rates(rates: Array2<f64>) -> Result<Self, BuildError> {
        if let Some((flat, &rate)) = rates.iter().enumerate().find(|&(_, &rate)| rate < 0.) {
            return Err(BuildError::NegativeRate {
                state: flat,
                rate,
            });
        }
        Ok(Self { rates })
    }

    pub fn rates(&self) -> &Array2<f64> {
        &self.rates
    }

    pub fn rate(&self, irreducible: usize, band: usize) -> f64 {
        self.rates[[irreducible, band]]
    }

    /// Inverse of the rate, or zero when no scattering route exists
    pub fn lifetime(&self, irreducible: usize, band: usize) -> f64 {
        let rate = self.rate(irreducible, band);
        if rate == 0. {
            0.
        } else {
            1. / rate
        }
    }
}

#[cfg(test)]
mod test {
    use super::RtaRates;
    use ndarray::Array2;
    use rand::Rng;

    #[test]
    fn matthiessen_rule_is_an_exact_sum() {
        let mut rng = rand::thread_rng();
        let channels = (0..3)
            .map(|_| Array2::from_shape_fn((5, 2), |_| rng.gen::<f64>()))
            .collect::<Vec<_>>();
        let rates = RtaRates::matthiessen(5, 2, &channels).unwrap();
        for iq in 0..5 {
            for ib in 0..2 {
                let expected = channels[0][[iq, ib]] + channels[1][[iq, ib]] + channels[2][[iq, ib]];
                assert_eq!(rates.rate(iq, ib), expected);
            }
        }
    }

    #[test]
    fn all_zero_channels_give_zero_rates_and_lifetimes() {
        let channels = vec![Array2::zeros((4, 3)); 2];
        let rates = RtaRates::matthiessen(4, 3, &channels).unwrap();
        assert!(rates.rates().iter().all(|&rate| rate == 0.));
        assert_eq!(rates.lifetime(2, 1), 0.);
    }

    #[test]
    fn no_channels_give_zero_rates() {
        let rates = RtaRates::matthiessen(2, 2, &[]).unwrap();
        assert_eq!(rates.rates(), &Array2::<f64>::zeros((2, 2)));
    }

    #[test]
    fn mismatched_channel_shape_is_rejected() {
        let channels = vec![Array2::zeros((4, 3)), Array2::zeros((3, 3))];
        assert!(RtaRates::matthiessen(4, 3, &channels).is_err());
    }

    #[test]
    fn negative_rate_is_rejected() {
        let mut channel = Array2::zeros((2, 2));
        channel[[1, 0]] = -1.;
        assert!(RtaRates::matthiessen(2, 2, &[channel]).is_err());
    }

    #[test]
    fn lifetime_is_inverse_rate() {
        let rates = RtaRates::from_rates(Array2::from_elem((1, 1), 4.)).unwrap();
        assert_eq!(rates.lifetime(0, 0), 0.25);
    }
}
