/// Start-up and tear-down hooks driven by the host application.
///
/// Components that need nothing at either point keep the defaults.
pub trait Lifecycle {
    type Error;

    fn init(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn shutdown(&mut self) {}
}
