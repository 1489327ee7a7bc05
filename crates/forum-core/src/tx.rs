//! Capacidad transaccional abstracta.
//!
//! El core solo exige begin/commit/rollback con la garantía estándar: ningún
//! efecto de una unidad de trabajo revertida es observable desde afuera. La
//! implementación concreta (base de datos, store en memoria) la provee el
//! colaborador de almacenamiento; el engine nunca depende de un driver.

/// Proveedor de unidades de trabajo atómicas.
pub trait Transactor: Send + Sync {
    /// Abre una unidad de trabajo. El Runner decide commit o rollback
    /// exactamente una vez por invocación del step transaccional.
    fn begin(&self) -> Box<dyn UnitOfWork>;
}

/// Unidad de trabajo abierta. Consumirla garantiza la decisión única:
/// commit y rollback toman `Box<Self>` por valor.
pub trait UnitOfWork {
    fn commit(self: Box<Self>);
    fn rollback(self: Box<Self>);
}

/// Transactor por defecto para pipelines sin efectos transaccionales
/// (o para tests del engine): begin/commit/rollback no hacen nada.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTransactor;

struct NoopUnit;

impl Transactor for NoopTransactor {
    fn begin(&self) -> Box<dyn UnitOfWork> {
        Box::new(NoopUnit)
    }
}

impl UnitOfWork for NoopUnit {
    fn commit(self: Box<Self>) {}
    fn rollback(self: Box<Self>) {}
}
