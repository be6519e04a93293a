pub mod ultrasound_error;
