// Vulkan Device - Core GPU interface
//
// Responsibilities:
// - Instance creation with the window system's surface extensions
// - Surface creation for the target window
// - Physical device selection (graphics + present support, prefer discrete)
// - Logical device with graphics and present queues
// - Memory allocator setup and a one-shot upload path

use anyhow::{Context, Result};
use ash::{vk, Entry};
use gpu_allocator::vulkan::{Allocation, Allocator, AllocatorCreateDesc};
use parking_lot::Mutex;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::collections::HashMap;
use std::ffi::{c_char, CStr, CString};
use std::mem::ManuallyDrop;
use std::sync::Arc;
use winit::window::Window;

use super::gpu::QueueFamilies;

/// Vulkan device wrapper with automatic cleanup
pub struct VulkanDevice {
    // Dropped by hand before the device (see Drop)
    allocator: ManuallyDrop<Mutex<Allocator>>,
    pub(super) color_targets: Mutex<HashMap<vk::Image, Allocation>>,

    pub device: ash::Device,
    pub physical_device: vk::PhysicalDevice,
    pub instance: ash::Instance,
    _entry: Entry,

    // Presentation
    pub surface: vk::SurfaceKHR,
    pub surface_loader: ash::khr::surface::Instance,
    pub swapchain_loader: ash::khr::swapchain::Device,

    // Queue handles
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    pub queue_families: QueueFamilies,

    upload_pool: vk::CommandPool,

    // Debug utils (if validation enabled)
    debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,

    pub properties: vk::PhysicalDeviceProperties,
}

impl VulkanDevice {
    /// Create the Vulkan device for `window`
    ///
    /// # Arguments
    /// * `app_name` - Application name for debugging
    /// * `enable_validation` - Enable Vulkan validation layers (debug only)
    /// * `window` - Window whose surface we present to
    pub fn new(app_name: &str, enable_validation: bool, window: &Window) -> Result<Arc<Self>> {
        log::info!("Creating Vulkan device: {}", app_name);

        // Step 1: Load Vulkan library
        let entry = unsafe { Entry::load() }
            .context("Failed to load Vulkan library. Is Vulkan installed?")?;

        let display_handle = window
            .display_handle()
            .context("Failed to get display handle")?
            .as_raw();
        let window_handle = window
            .window_handle()
            .context("Failed to get window handle")?
            .as_raw();

        // Step 2: Create instance
        let surface_extensions = ash_window::enumerate_required_extensions(display_handle)
            .context("Window system is not supported by Vulkan")?;
        let instance = Self::create_instance(&entry, app_name, enable_validation, surface_extensions)?;

        // Step 3: Setup debug messenger if validation enabled
        let debug_utils = if enable_validation {
            Some(Self::setup_debug_messenger(&entry, &instance)?)
        } else {
            None
        };

        // Step 4: Create surface
        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
        let surface = unsafe {
            ash_window::create_surface(&entry, &instance, display_handle, window_handle, None)
        }
        .context("Failed to create window surface")?;

        // Step 5: Pick physical device (GPU)
        let (physical_device, queue_families) =
            Self::pick_physical_device(&instance, &surface_loader, surface)?;

        // Step 6: Create logical device
        let (device, graphics_queue, present_queue) =
            Self::create_logical_device(&instance, physical_device, queue_families)?;

        let properties = unsafe { instance.get_physical_device_properties(physical_device) };

        log::info!(
            "Selected GPU: {}",
            unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }.to_string_lossy()
        );
        log::info!(
            "API Version: {}.{}.{}",
            vk::api_version_major(properties.api_version),
            vk::api_version_minor(properties.api_version),
            vk::api_version_patch(properties.api_version)
        );
        log::info!(
            "Queue families: graphics={}, present={}",
            queue_families.graphics,
            queue_families.present
        );

        // Step 7: Create memory allocator
        let allocator = Self::create_allocator(&instance, physical_device, &device)?;

        // Step 8: Pool for one-shot uploads
        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(queue_families.graphics)
            .flags(vk::CommandPoolCreateFlags::TRANSIENT);
        let upload_pool = unsafe { device.create_command_pool(&pool_info, None) }
            .context("Failed to create upload command pool")?;

        let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &device);

        Ok(Arc::new(Self {
            allocator: ManuallyDrop::new(Mutex::new(allocator)),
            color_targets: Mutex::new(HashMap::new()),
            device,
            physical_device,
            instance,
            _entry: entry,
            surface,
            surface_loader,
            swapchain_loader,
            graphics_queue,
            present_queue,
            queue_families,
            upload_pool,
            debug_utils,
            properties,
        }))
    }

    fn create_instance(
        entry: &Entry,
        app_name: &str,
        enable_validation: bool,
        surface_extensions: &[*const c_char],
    ) -> Result<ash::Instance> {
        let app_name_cstr = CString::new(app_name)?;
        let engine_name = CString::new("frameloop")?;

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name_cstr)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(&engine_name)
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_2);

        let mut extensions = surface_extensions.to_vec();
        if enable_validation {
            extensions.push(ash::ext::debug_utils::NAME.as_ptr());
        }

        let layer_names = if enable_validation {
            vec![c"VK_LAYER_KHRONOS_validation".as_ptr()]
        } else {
            vec![]
        };

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names);

        let instance = unsafe { entry.create_instance(&create_info, None) }
            .context("Failed to create Vulkan instance")?;

        Ok(instance)
    }

    fn setup_debug_messenger(
        entry: &Entry,
        instance: &ash::Instance,
    ) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
        let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(debug_callback));

        let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }?;

        Ok((debug_utils, messenger))
    }

    fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<(vk::PhysicalDevice, QueueFamilies)> {
        let devices = unsafe { instance.enumerate_physical_devices() }?;

        if devices.is_empty() {
            anyhow::bail!("No Vulkan-capable GPU found");
        }

        // Score each device
        let mut best_device = None;
        let mut best_score = 0;

        for device in devices {
            let props = unsafe { instance.get_physical_device_properties(device) };

            if !Self::supports_swapchain(instance, device)? {
                continue;
            }

            let Some(families) = Self::find_queue_families(instance, surface_loader, surface, device)? else {
                continue;
            };

            let score = match props.device_type {
                vk::PhysicalDeviceType::DISCRETE_GPU => 1000,
                vk::PhysicalDeviceType::INTEGRATED_GPU => 100,
                _ => 1,
            };

            if score > best_score {
                best_score = score;
                best_device = Some((device, families));
            }
        }

        best_device.ok_or_else(|| anyhow::anyhow!("No GPU can render and present to this window"))
    }

    fn supports_swapchain(instance: &ash::Instance, device: vk::PhysicalDevice) -> Result<bool> {
        let extensions = unsafe { instance.enumerate_device_extension_properties(device) }?;
        Ok(extensions.iter().any(|ext| {
            let name = unsafe { CStr::from_ptr(ext.extension_name.as_ptr()) };
            name == ash::khr::swapchain::NAME
        }))
    }

    /// Graphics family plus a family that can present to `surface`,
    /// preferring one family that does both
    fn find_queue_families(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        device: vk::PhysicalDevice,
    ) -> Result<Option<QueueFamilies>> {
        let families = unsafe { instance.get_physical_device_queue_family_properties(device) };

        let mut graphics = None;
        let mut present = None;

        for (index, family) in families.iter().enumerate() {
            let index = index as u32;
            let has_graphics = family.queue_flags.contains(vk::QueueFlags::GRAPHICS);
            let can_present = unsafe {
                surface_loader.get_physical_device_surface_support(device, index, surface)
            }?;

            if has_graphics && can_present {
                return Ok(Some(QueueFamilies { graphics: index, present: index }));
            }
            if has_graphics && graphics.is_none() {
                graphics = Some(index);
            }
            if can_present && present.is_none() {
                present = Some(index);
            }
        }

        Ok(graphics
            .zip(present)
            .map(|(graphics, present)| QueueFamilies { graphics, present }))
    }

    fn create_logical_device(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        families: QueueFamilies,
    ) -> Result<(ash::Device, vk::Queue, vk::Queue)> {
        let queue_priorities = [1.0];

        let mut unique_families = vec![families.graphics];
        if !families.shared() {
            unique_families.push(families.present);
        }

        let queue_create_infos: Vec<_> = unique_families
            .iter()
            .map(|&family| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family)
                    .queue_priorities(&queue_priorities)
            })
            .collect();

        let extensions = [ash::khr::swapchain::NAME.as_ptr()];
        let features = vk::PhysicalDeviceFeatures::default();

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&features);

        let device = unsafe { instance.create_device(physical_device, &create_info, None) }
            .context("Failed to create logical device")?;

        let graphics_queue = unsafe { device.get_device_queue(families.graphics, 0) };
        let present_queue = unsafe { device.get_device_queue(families.present, 0) };

        Ok((device, graphics_queue, present_queue))
    }

    fn create_allocator(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        device: &ash::Device,
    ) -> Result<Allocator> {
        let allocator = Allocator::new(&AllocatorCreateDesc {
            instance: instance.clone(),
            device: device.clone(),
            physical_device,
            debug_settings: Default::default(),
            buffer_device_address: false,
            allocation_sizes: Default::default(),
        })?;

        Ok(allocator)
    }

    pub fn allocator(&self) -> &Mutex<Allocator> {
        &self.allocator
    }

    /// Record and run a one-off command buffer on the graphics queue,
    /// blocking until the GPU has executed it
    pub fn submit_once(&self, record: impl FnOnce(&ash::Device, vk::CommandBuffer)) -> Result<()> {
        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(self.upload_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        unsafe {
            let cmd = self.device.allocate_command_buffers(&alloc_info)?[0];

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
            self.device.begin_command_buffer(cmd, &begin_info)?;
            record(&self.device, cmd);
            self.device.end_command_buffer(cmd)?;

            let fence = self.device.create_fence(&vk::FenceCreateInfo::default(), None)?;
            let command_buffers = [cmd];
            let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);

            let result = self
                .device
                .queue_submit(self.graphics_queue, &[submit_info], fence)
                .and_then(|_| self.device.wait_for_fences(&[fence], true, u64::MAX));

            self.device.destroy_fence(fence, None);
            self.device.free_command_buffers(self.upload_pool, &command_buffers);
            result.context("One-shot upload failed")?;
        }

        Ok(())
    }

    /// Wait for device to be idle (e.g., before cleanup)
    pub fn wait_idle(&self) -> Result<()> {
        unsafe { self.device.device_wait_idle() }?;
        Ok(())
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        log::info!("Destroying Vulkan device...");

        let _ = self.wait_idle();

        unsafe {
            // Anything still allocated goes back before the allocator dies
            let leftovers: Vec<_> = self.color_targets.get_mut().drain().collect();
            for (image, allocation) in leftovers {
                log::warn!("Color target {:?} still alive at device teardown", image);
                self.device.destroy_image(image, None);
                let _ = self.allocator.get_mut().free(allocation);
            }
            ManuallyDrop::drop(&mut self.allocator);

            self.device.destroy_command_pool(self.upload_pool, None);
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);

            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

// Debug callback for validation layers
unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = CStr::from_ptr((*p_callback_data).p_message);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("[Vulkan] {}", message.to_string_lossy());
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("[Vulkan] {}", message.to_string_lossy());
        }
        _ => {
            log::debug!("[Vulkan] {}", message.to_string_lossy());
        }
    }

    vk::FALSE
}
