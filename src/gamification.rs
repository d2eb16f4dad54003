//! Adherence gamification: badges, points, levels.
//!
//! Explicitly constructed state, injected where needed. Counters live on
//! the user record; the health-info catalog is joined in so read progress
//! can be tracked against it.

use chrono::Utc;
use uuid::Uuid;

use crate::models::enums::BadgeCategory;
use crate::models::{Badge, HealthInfo, User};

const POINTS_PER_LEVEL: i32 = 100;

#[derive(Debug, Clone, Default)]
pub struct Gamification {
    pub badges: Vec<Badge>,
    pub health_infos: Vec<HealthInfo>,
    pub adherence_score: i32,
    pub minigames_played: u32,
    pub minigames_won: u32,
}

impl Gamification {
    /// Build the gamification state for a user against the current
    /// health-info catalog, restoring read flags from the user's record.
    pub fn for_user(user: &User, catalog: Vec<HealthInfo>) -> Self {
        let mut health_infos = catalog;
        for info in &mut health_infos {
            if user.health_info_read.contains(&info.id) {
                info.is_read = true;
            }
        }
        Self {
            badges: user.badges.clone(),
            health_infos,
            adherence_score: user.adherence_score,
            minigames_played: user.minigames_played,
            minigames_won: 0,
        }
    }

    /// Write the counters back onto the user record for persistence.
    pub fn apply_to_user(&self, user: &mut User) {
        user.adherence_score = self.adherence_score;
        user.badges = self.badges.clone();
        user.health_info_read = self
            .health_infos
            .iter()
            .filter(|i| i.is_read)
            .map(|i| i.id)
            .collect();
        user.minigames_played = self.minigames_played;
    }

    /// Add a badge unless one with the same id is already earned.
    pub fn earn_badge(&mut self, badge: Badge) -> bool {
        if self.badges.iter().any(|b| b.id == badge.id) {
            return false;
        }
        self.badges.push(badge);
        true
    }

    /// Award the milestone badge for a category if its threshold is met and
    /// it has not been earned yet.
    pub fn check_and_award(&mut self, category: BadgeCategory) -> Option<Badge> {
        let badge = match category {
            BadgeCategory::Adherence if self.adherence_score >= 90 => Badge {
                id: Uuid::new_v4(),
                title: "Adherence Champion".into(),
                description: "Maintained over 90% medication adherence".into(),
                image_name: "badge_adherence_champion".into(),
                date_earned: Utc::now(),
                category: BadgeCategory::Adherence,
                points: 150,
                is_unlocked: true,
            },
            BadgeCategory::HealthInfo
                if self.health_infos.iter().filter(|i| i.is_read).count() >= 3 =>
            {
                Badge {
                    id: Uuid::new_v4(),
                    title: "Health Enthusiast".into(),
                    description: "Read 3+ health information articles".into(),
                    image_name: "badge_health_enthusiast".into(),
                    date_earned: Utc::now(),
                    category: BadgeCategory::HealthInfo,
                    points: 75,
                    is_unlocked: true,
                }
            }
            BadgeCategory::Activity if self.minigames_played >= 5 => Badge {
                id: Uuid::new_v4(),
                title: "Game Master".into(),
                description: "Played 5+ health minigames".into(),
                image_name: "badge_game_master".into(),
                date_earned: Utc::now(),
                category: BadgeCategory::Activity,
                points: 50,
                is_unlocked: true,
            },
            _ => return None,
        };

        // Milestone badges are identified by title, not id: a fresh id is
        // minted per award attempt.
        if self.badges.iter().any(|b| b.title == badge.title) {
            return None;
        }
        self.badges.push(badge.clone());
        Some(badge)
    }

    pub fn update_adherence_score(&mut self, score: i32) -> Option<Badge> {
        self.adherence_score = score;
        self.check_and_award(BadgeCategory::Adherence)
    }

    /// Mark an article read now; may award the health-info badge.
    pub fn mark_health_info_read(&mut self, id: Uuid) -> Option<Badge> {
        let info = self.health_infos.iter_mut().find(|i| i.id == id)?;
        info.is_read = true;
        info.read_date = Some(Utc::now());
        self.check_and_award(BadgeCategory::HealthInfo)
    }

    pub fn record_minigame_play(&mut self, won: bool) -> Option<Badge> {
        self.minigames_played += 1;
        if won {
            self.minigames_won += 1;
        }
        self.check_and_award(BadgeCategory::Activity)
    }

    /// Badge points plus half the adherence score.
    pub fn total_points(&self) -> i32 {
        self.badges.iter().map(|b| b.points).sum::<i32>() + self.adherence_score / 2
    }

    pub fn adherence_level(&self) -> &'static str {
        match self.adherence_score {
            90.. => "Excellent",
            75..=89 => "Good",
            60..=74 => "Fair",
            _ => "Needs Improvement",
        }
    }

    /// Level number and progress (0.0–1.0) toward the next level.
    pub fn user_level(&self) -> (i32, f64) {
        let points = self.total_points();
        let level = points / POINTS_PER_LEVEL + 1;
        let progress = f64::from(points % POINTS_PER_LEVEL) / f64::from(POINTS_PER_LEVEL);
        (level, progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed;

    fn state() -> Gamification {
        Gamification {
            badges: Vec::new(),
            health_infos: seed::sample_health_infos(),
            adherence_score: 85,
            minigames_played: 0,
            minigames_won: 0,
        }
    }

    #[test]
    fn earn_badge_deduplicates_by_id() {
        let mut g = state();
        let badge = seed::sample_badges().remove(0);
        assert!(g.earn_badge(badge.clone()));
        assert!(!g.earn_badge(badge));
        assert_eq!(g.badges.len(), 1);
    }

    #[test]
    fn adherence_badge_awarded_at_ninety() {
        let mut g = state();
        assert!(g.update_adherence_score(89).is_none());

        let badge = g.update_adherence_score(93).unwrap();
        assert_eq!(badge.title, "Adherence Champion");
        assert_eq!(badge.points, 150);

        // Not awarded twice.
        assert!(g.update_adherence_score(95).is_none());
    }

    #[test]
    fn health_info_badge_needs_three_reads() {
        let mut g = state();
        let ids: Vec<Uuid> = g.health_infos.iter().map(|i| i.id).collect();
        assert!(ids.len() >= 3);

        assert!(g.mark_health_info_read(ids[0]).is_none());
        assert!(g.mark_health_info_read(ids[1]).is_none());
        let badge = g.mark_health_info_read(ids[2]).unwrap();
        assert_eq!(badge.title, "Health Enthusiast");

        let read = g.health_infos.iter().filter(|i| i.is_read).count();
        assert_eq!(read, 3);
        assert!(g.health_infos[0].read_date.is_some());
    }

    #[test]
    fn unknown_health_info_id_is_ignored() {
        let mut g = state();
        assert!(g.mark_health_info_read(Uuid::new_v4()).is_none());
        assert!(g.health_infos.iter().all(|i| !i.is_read));
    }

    #[test]
    fn activity_badge_needs_five_plays() {
        let mut g = state();
        for _ in 0..4 {
            assert!(g.record_minigame_play(false).is_none());
        }
        let badge = g.record_minigame_play(true).unwrap();
        assert_eq!(badge.title, "Game Master");
        assert_eq!(g.minigames_played, 5);
        assert_eq!(g.minigames_won, 1);
    }

    #[test]
    fn vaccine_and_meds_check_award_nothing() {
        let mut g = state();
        g.adherence_score = 100;
        g.minigames_played = 10;
        assert!(g.check_and_award(BadgeCategory::Vaccine).is_none());
        assert!(g.check_and_award(BadgeCategory::MedsCheck).is_none());
    }

    #[test]
    fn total_points_and_level() {
        let mut g = state();
        g.adherence_score = 80; // 40 points
        g.badges = seed::sample_badges(); // 100+75+50+125+75 = 425 points
        assert_eq!(g.total_points(), 465);

        let (level, progress) = g.user_level();
        assert_eq!(level, 5);
        assert!((progress - 0.65).abs() < 1e-9);
    }

    #[test]
    fn adherence_level_bands() {
        let mut g = state();
        for (score, level) in [(95, "Excellent"), (80, "Good"), (65, "Fair"), (40, "Needs Improvement")]
        {
            g.adherence_score = score;
            assert_eq!(g.adherence_level(), level);
        }
    }

    #[test]
    fn round_trips_through_user_record() {
        let mut user = seed::sample_user();
        let catalog = seed::sample_health_infos();
        let mut g = Gamification::for_user(&user, catalog.clone());
        assert_eq!(g.adherence_score, user.adherence_score);

        g.update_adherence_score(91);
        let ids: Vec<Uuid> = g.health_infos.iter().map(|i| i.id).collect();
        g.mark_health_info_read(ids[0]);
        g.record_minigame_play(true);
        g.apply_to_user(&mut user);

        assert_eq!(user.adherence_score, 91);
        assert_eq!(user.health_info_read, vec![ids[0]]);
        assert_eq!(user.minigames_played, g.minigames_played);
        assert!(user.badges.iter().any(|b| b.title == "Adherence Champion"));

        // Restoring against the same catalog marks the article read again.
        let restored = Gamification::for_user(&user, catalog);
        assert_eq!(restored.health_infos.iter().filter(|i| i.is_read).count(), 1);
    }
}
