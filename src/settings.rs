// Cross-cutting render settings
//
// Owned by the frame loop and handed by reference to whoever needs it; the
// overlay writes through it, the render graph reads it on recreation.

use ash::vk;

const MAX_SAMPLES: u32 = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSettings {
    msaa: bool,
    sample_count: u32,
    changed: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self::new(false, 4)
    }
}

impl RenderSettings {
    pub fn new(msaa: bool, sample_count: u32) -> Self {
        Self {
            msaa,
            sample_count: round_up_samples(sample_count),
            changed: false,
        }
    }

    pub fn msaa(&self) -> bool {
        self.msaa
    }

    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn set_msaa(&mut self, enabled: bool) {
        if self.msaa != enabled {
            self.msaa = enabled;
            self.changed = true;
        }
    }

    /// Stores the next power of two at or above `count`.
    pub fn set_sample_count(&mut self, count: u32) {
        let count = round_up_samples(count);
        if self.sample_count != count {
            self.sample_count = count;
            self.changed = true;
        }
    }

    /// Returns true once per batch of changes.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    /// Sample flag to render with, limited to what the device supports.
    pub fn samples(&self, supported: vk::SampleCountFlags) -> vk::SampleCountFlags {
        if !self.msaa {
            return vk::SampleCountFlags::TYPE_1;
        }

        let mut count = self.sample_count;
        while count > 1 {
            let flag = vk::SampleCountFlags::from_raw(count);
            if supported.contains(flag) {
                return flag;
            }
            count /= 2;
        }
        vk::SampleCountFlags::TYPE_1
    }
}

fn round_up_samples(count: u32) -> u32 {
    count.clamp(1, MAX_SAMPLES).next_power_of_two()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_count_rounds_up_to_power_of_two() {
        let mut settings = RenderSettings::default();
        settings.set_sample_count(3);
        assert_eq!(settings.sample_count(), 4);
        settings.set_sample_count(5);
        assert_eq!(settings.sample_count(), 8);
        settings.set_sample_count(0);
        assert_eq!(settings.sample_count(), 1);
        settings.set_sample_count(1000);
        assert_eq!(settings.sample_count(), 64);
    }

    #[test]
    fn change_flag_is_raised_once() {
        let mut settings = RenderSettings::new(false, 4);
        assert!(!settings.take_changed());

        settings.set_msaa(true);
        settings.set_sample_count(8);
        assert!(settings.take_changed());
        assert!(!settings.take_changed());
    }

    #[test]
    fn writing_the_same_value_is_not_a_change() {
        let mut settings = RenderSettings::new(true, 4);
        settings.set_msaa(true);
        settings.set_sample_count(3);
        assert!(!settings.take_changed());
    }

    #[test]
    fn samples_respect_toggle_and_device_limit() {
        let supported = vk::SampleCountFlags::TYPE_1
            | vk::SampleCountFlags::TYPE_2
            | vk::SampleCountFlags::TYPE_4;

        let off = RenderSettings::new(false, 4);
        assert_eq!(off.samples(supported), vk::SampleCountFlags::TYPE_1);

        let four = RenderSettings::new(true, 4);
        assert_eq!(four.samples(supported), vk::SampleCountFlags::TYPE_4);

        let sixteen = RenderSettings::new(true, 16);
        assert_eq!(sixteen.samples(supported), vk::SampleCountFlags::TYPE_4);

        let one = RenderSettings::new(true, 1);
        assert_eq!(one.samples(supported), vk::SampleCountFlags::TYPE_1);
    }
}
