use crate::domain::model::{SkillBarStyle, SkillRecord};

pub fn width_percent(level: f64, out_of: f64) -> u32 {
    if out_of <= 0.0 || !level.is_finite() {
        return 0;
    }
    (100.0 * level / out_of).round().clamp(0.0, 100.0) as u32
}

/// One horizontal bar per skill, filled to `level / out_of`.
pub fn render_skill_bars(skills: &[SkillRecord], style: &SkillBarStyle) -> String {
    skills
        .iter()
        .map(|skill| {
            let width = width_percent(skill.level, style.out_of);
            format!(
                "<div class='skill-bar' style=\"background:linear-gradient(to right, {color} {width}%, {background} {width}% 100%)\">{name}</div>",
                color = style.bar_color,
                background = style.bar_background,
                width = width,
                name = skill.skill,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
