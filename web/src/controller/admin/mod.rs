pub(crate) mod appointment_controller;
