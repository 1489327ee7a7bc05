use crate::model::{Delta, Failure};

/// Resultado abstracto de ejecutar un step.
///
/// `Continue` lleva el delta a mergear en el contexto; `Halt` detiene el
/// pipeline con el fallo ya atribuido a su step real.
pub enum StepRun {
    Continue(Delta),
    Halt(Failure),
}
