use erupt::vk;
use std::ffi::{c_void, CStr};

/// Forwards validation layer messages to the `log` facade.
pub unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagBitsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut c_void,
) -> vk::Bool32 {
    let types = match message_type {
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL_EXT => "[General]",
        vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE_EXT => "[Performance]",
        vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION_EXT => "[Validation]",
        _ => "[Unknown]",
    };
    let message = CStr::from_ptr((*p_callback_data).p_message).to_string_lossy();

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagBitsEXT::VERBOSE_EXT => {
            log::trace!("{} {}", types, message)
        }
        vk::DebugUtilsMessageSeverityFlagBitsEXT::INFO_EXT => {
            log::debug!("{} {}", types, message)
        }
        vk::DebugUtilsMessageSeverityFlagBitsEXT::WARNING_EXT => {
            log::warn!("{} {}", types, message)
        }
        vk::DebugUtilsMessageSeverityFlagBitsEXT::ERROR_EXT => {
            log::error!("{} {}", types, message)
        }
        _ => log::warn!("{} {}", types, message),
    };

    vk::FALSE
}
