/// The logistic function scaled by `amp`.
#[derive(Clone, Copy, Debug)]
pub struct Sigmoid {
    amp: f32,
}

impl Sigmoid {
    pub fn new(amp: f32) -> Self {
        Self { amp }
    }

    pub fn f(&self, z: f32) -> f32 {
        self.amp / (1. + (-z).exp())
    }

    pub fn df(&self, z: f32) -> f32 {
        let e = (-z).exp();
        (self.amp * e) / (e + 1.).powi(2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_at_half_amp() {
        let sigmoid = Sigmoid::new(2.);
        assert_eq!(sigmoid.f(0.), 1.);
        assert_eq!(sigmoid.df(0.), 0.5);
    }
}
