#![allow(non_snake_case)]

use super::DirectSolverSettings;
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use crate::symbolic::FactorizationKind;
use crate::timers::Timers;
use std::io::Write;
use std::time::Duration;

/// Summary statistics and diagnostic output for a [`DirectSolver`](crate::solver::DirectSolver)
#[derive(Debug, Default)]
pub struct DirectSolverInfo {
    /// factorization computed
    pub method: FactorizationKind,
    /// matrix dimensions (rows, cols)
    pub size: (usize, usize),
    /// entries in the input matrix
    pub nnz_A: usize,
    /// entries in the stored factors
    pub nnz_factors: usize,
    /// time spent in symbolic analysis
    pub analysis_time: Duration,
    /// time spent in numeric factorization
    pub factor_time: Duration,
    /// number of numeric factorizations performed
    pub factor_count: usize,
    pub(crate) stream: PrintTarget,
}

impl ConfigurablePrintTarget for DirectSolverInfo {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
    fn print_target(&mut self) -> &mut dyn Write {
        self.stream.print_target()
    }
}

impl DirectSolverInfo {
    pub(crate) fn update_timing(&mut self, timers: &Timers) {
        self.analysis_time = timers.elapsed("analysis").unwrap_or_default();
        self.factor_time = timers.elapsed("factor").unwrap_or_default();
    }

    pub(crate) fn print_configuration<T: FloatT>(
        &mut self,
        settings: &DirectSolverSettings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(
            out,
            "-------------------------------------------------------------"
        )?;
        writeln!(
            out,
            "           spfactor v{}  -  sparse direct solver",
            crate::VERSION
        )?;
        writeln!(
            out,
            "-------------------------------------------------------------"
        )?;
        writeln!(out)?;
        writeln!(out, "problem:")?;
        writeln!(out, "  rows          = {}", self.size.0)?;
        writeln!(out, "  cols          = {}", self.size.1)?;
        writeln!(out, "  nnz(A)        = {}", self.nnz_A)?;
        writeln!(out)?;
        writeln!(out, "settings:")?;
        writeln!(out, "  method        = {}", settings.method)?;
        writeln!(out, "  ordering      = {}", settings.ordering)?;
        if settings.method == FactorizationKind::Lu {
            writeln!(
                out,
                "  pivot tol     = {:.1e}, max realloc = {}",
                settings.pivot_tolerance, settings.max_lu_reallocations
            )?;
        }
        writeln!(
            out,
            "  check format  = {}",
            _bool_on_off(settings.check_format)
        )?;
        writeln!(out)?;
        out.flush()?;

        std::io::Result::Ok(())
    }

    pub(crate) fn print_status<T: FloatT>(
        &mut self,
        settings: &DirectSolverSettings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(out, "factorization {}:", self.factor_count)?;
        writeln!(out, "  nnz(factors)  = {}", self.nnz_factors)?;
        writeln!(
            out,
            "  fill ratio    = {:.2}",
            self.nnz_factors as f64 / usize::max(self.nnz_A, 1) as f64
        )?;
        writeln!(out, "  analysis time = {:?}", self.analysis_time)?;
        writeln!(out, "  factor time   = {:?}", self.factor_time)?;
        out.flush()?;

        std::io::Result::Ok(())
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}
