mod methods;

pub(crate) use methods::Inner;

use crate::{
    iteration::{Coupling, ElectronIterator},
    outer_loop::Convergence,
    FieldPair, Particle, ResponseFunction,
};
use boltzmann_mesher::Grid;

/// The phonon responses an electron sweep is dragged by
#[derive(Clone, Copy, Debug)]
pub(crate) struct PhononFields<'a> {
    pub(crate) phonon: &'a Particle,
    pub(crate) responses: &'a FieldPair<ResponseFunction>,
    pub(crate) fine_grid: &'a Grid,
}

/// Builder struct for the electron loop
pub(crate) struct InnerLoopBuilder<
    RefConvergenceSettings,
    RefElectron,
    RefFieldTerms,
    RefIterator,
    RefAggregator,
> {
    convergence_settings: RefConvergenceSettings,
    electron: RefElectron,
    field_terms: RefFieldTerms,
    iterator: RefIterator,
    aggregator: RefAggregator,
}

impl InnerLoopBuilder<(), (), (), (), ()> {
    pub(crate) fn new() -> Self {
        Self {
            convergence_settings: (),
            electron: (),
            field_terms: (),
            iterator: (),
            aggregator: (),
        }
    }
}

impl<RefConvergenceSettings, RefElectron, RefFieldTerms, RefIterator, RefAggregator>
    InnerLoopBuilder<RefConvergenceSettings, RefElectron, RefFieldTerms, RefIterator, RefAggregator>
{
    pub(crate) fn with_convergence_settings<ConvergenceSettings>(
        self,
        convergence_settings: &ConvergenceSettings,
    ) -> InnerLoopBuilder<&ConvergenceSettings, RefElectron, RefFieldTerms, RefIterator, RefAggregator>
    {
        InnerLoopBuilder {
            convergence_settings,
            electron: self.electron,
            field_terms: self.field_terms,
            iterator: self.iterator,
            aggregator: self.aggregator,
        }
    }

    pub(crate) fn with_electron<Electron>(
        self,
        electron: &Electron,
    ) -> InnerLoopBuilder<RefConvergenceSettings, &Electron, RefFieldTerms, RefIterator, RefAggregator>
    {
        InnerLoopBuilder {
            convergence_settings: self.convergence_settings,
            electron,
            field_terms: self.field_terms,
            iterator: self.iterator,
            aggregator: self.aggregator,
        }
    }

    /// Attach the fixed driving terms of both fields
    pub(crate) fn with_field_terms<FieldTerms>(
        self,
        field_terms: &FieldTerms,
    ) -> InnerLoopBuilder<RefConvergenceSettings, RefElectron, &FieldTerms, RefIterator, RefAggregator>
    {
        InnerLoopBuilder {
            convergence_settings: self.convergence_settings,
            electron: self.electron,
            field_terms,
            iterator: self.iterator,
            aggregator: self.aggregator,
        }
    }

    pub(crate) fn with_iterator<Iterator>(
        self,
        iterator: &Iterator,
    ) -> InnerLoopBuilder<RefConvergenceSettings, RefElectron, RefFieldTerms, &Iterator, RefAggregator>
    {
        InnerLoopBuilder {
            convergence_settings: self.convergence_settings,
            electron: self.electron,
            field_terms: self.field_terms,
            iterator,
            aggregator: self.aggregator,
        }
    }

    pub(crate) fn with_aggregator<Aggregator>(
        self,
        aggregator: &Aggregator,
    ) -> InnerLoopBuilder<RefConvergenceSettings, RefElectron, RefFieldTerms, RefIterator, &Aggregator>
    {
        InnerLoopBuilder {
            convergence_settings: self.convergence_settings,
            electron: self.electron,
            field_terms: self.field_terms,
            iterator: self.iterator,
            aggregator,
        }
    }
}

/// Iterates the electron BTE for both fields at fixed phonon responses
pub(crate) struct InnerLoop<'a, S, A> {
    convergence_settings: &'a Convergence,
    electron: &'a Particle,
    field_terms: &'a FieldPair<ResponseFunction>,
    iterator: &'a ElectronIterator<'a, S>,
    aggregator: &'a A,
    coupling: Coupling<PhononFields<'a>>,
    temperature: f64,
}

impl<'a, S, A>
    InnerLoopBuilder<
        &'a Convergence,
        &'a Particle,
        &'a FieldPair<ResponseFunction>,
        &'a ElectronIterator<'a, S>,
        &'a A,
    >
{
    /// Without drag the temperature-gradient response follows the electric-field one
    /// through the Kelvin relation instead of being iterated
    pub(crate) fn build(
        self,
        coupling: Coupling<PhononFields<'a>>,
        temperature: f64,
    ) -> InnerLoop<'a, S, A> {
        InnerLoop {
            convergence_settings: self.convergence_settings,
            electron: self.electron,
            field_terms: self.field_terms,
            iterator: self.iterator,
            aggregator: self.aggregator,
            coupling,
            temperature,
        }
    }
}
