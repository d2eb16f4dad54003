//! Demo fixtures: a sample patient, prescription set, badge and
//! health-info catalogs.
//!
//! Constructed values for tests and offline demos, injected where needed.
//! Shapes mirror real pharmacy data; ids are fresh per call.

use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::models::enums::*;
use crate::models::*;

/// A mid-fulfillment Metformin refill, four stages into its history.
pub fn sample_prescription(for_user: Uuid, for_user_name: &str) -> Prescription {
    let now = Utc::now();
    Prescription {
        id: Uuid::new_v4(),
        rx_number: "RX123456".into(),
        medication_name: "Metformin".into(),
        dosage: "500mg".into(),
        instructions: "Take one tablet twice daily with meals".into(),
        prescribed_date: now - Duration::days(7),
        expiry_date: now + Duration::days(180),
        refills_remaining: 3,
        status: PrescriptionStatus::PrepPackaging,
        prescription_type: PrescriptionType::Refill,
        for_user,
        for_user_name: for_user_name.into(),
        status_history: vec![
            StatusUpdate {
                status: PrescriptionStatus::RequestReceived,
                timestamp: now - Duration::days(2),
                message: Some("Your prescription refill request has been received".into()),
            },
            StatusUpdate {
                status: PrescriptionStatus::Entered,
                timestamp: now - Duration::hours(36),
                message: None,
            },
            StatusUpdate {
                status: PrescriptionStatus::PharmacistCheck,
                timestamp: now - Duration::days(1),
                message: None,
            },
            StatusUpdate {
                status: PrescriptionStatus::PrepPackaging,
                timestamp: now,
                message: None,
            },
        ],
        notes: None,
        pharmacist_message: None,
        messages: Vec::new(),
        image_url: None,
        total_cost: Some(45.99),
        insurance_coverage: Some(35.00),
        copay_amount: Some(10.99),
        dispensing_fee: Some(12.99),
        notified_on_status_change: false,
        adherence_percentage: 100.0,
        last_taken: None,
        next_due_date: None,
    }
}

/// The demo patient with one family member.
pub fn sample_user() -> User {
    User {
        id: Uuid::new_v4(),
        username: "johndoe".into(),
        email: "john@example.com".into(),
        first_name: "John".into(),
        last_name: "Doe".into(),
        date_of_birth: Utc::now() - Duration::weeks(52 * 45),
        phone_number: "555-123-4567".into(),
        health_conditions: vec!["Hypertension".into(), "Type 2 Diabetes".into()],
        allergies: vec!["Penicillin".into(), "Pollen".into()],
        family_members: vec![sample_family_member()],
        profile_image_name: Some("default_profile".into()),
        user_type: UserType::Patient,
        pharmacy_name: None,
        license_number: None,
        adherence_score: 85,
        badges: Vec::new(),
        health_info_read: Vec::new(),
        minigames_played: 0,
    }
}

pub fn sample_family_member() -> FamilyMember {
    FamilyMember {
        id: Uuid::new_v4(),
        relationship: "Child".into(),
        first_name: "Emma".into(),
        last_name: "Doe".into(),
        date_of_birth: Utc::now() - Duration::weeks(52 * 8),
        health_conditions: vec!["Asthma".into()],
        allergies: vec!["Nuts".into()],
    }
}

/// The demo prescription set: one per interesting lifecycle state, plus a
/// completed family-member prescription with a full seven-step history.
pub fn sample_prescriptions(user: &User) -> Vec<Prescription> {
    let now = Utc::now();
    let patient = user.id;
    let patient_name = format!("{} {}", user.first_name, user.last_name);

    let metformin = sample_prescription(patient, &patient_name);

    let mut lisinopril = sample_prescription(patient, &patient_name);
    lisinopril.rx_number = "RX789012".into();
    lisinopril.medication_name = "Lisinopril".into();
    lisinopril.status = PrescriptionStatus::ReadyForPickup;
    lisinopril.status_history = [
        PrescriptionStatus::RequestReceived,
        PrescriptionStatus::Entered,
        PrescriptionStatus::PharmacistCheck,
        PrescriptionStatus::PrepPackaging,
        PrescriptionStatus::Billing,
        PrescriptionStatus::ReadyForPickup,
    ]
    .iter()
    .enumerate()
    .map(|(i, status)| StatusUpdate {
        status: *status,
        timestamp: now - Duration::days(5 - i as i64),
        message: None,
    })
    .collect();

    let mut atorvastatin = sample_prescription(patient, &patient_name);
    atorvastatin.rx_number = "RX456789".into();
    atorvastatin.medication_name = "Atorvastatin".into();
    atorvastatin.status = PrescriptionStatus::RequestReceived;
    atorvastatin.prescription_type = PrescriptionType::New;
    atorvastatin.status_history = vec![StatusUpdate {
        status: PrescriptionStatus::RequestReceived,
        timestamp: now - Duration::hours(2),
        message: None,
    }];

    let mut amoxicillin = sample_prescription(patient, &patient_name);
    amoxicillin.rx_number = "RX123890".into();
    amoxicillin.medication_name = "Amoxicillin".into();
    amoxicillin.dosage = "500mg".into();
    amoxicillin.instructions = "Take one capsule three times daily with food".into();
    amoxicillin.status = PrescriptionStatus::PharmacistCheck;
    amoxicillin.prescription_type = PrescriptionType::New;
    amoxicillin.refills_remaining = 0;
    amoxicillin.status_history = vec![
        StatusUpdate {
            status: PrescriptionStatus::RequestReceived,
            timestamp: now - Duration::hours(36),
            message: None,
        },
        StatusUpdate {
            status: PrescriptionStatus::Entered,
            timestamp: now - Duration::days(1),
            message: None,
        },
        StatusUpdate {
            status: PrescriptionStatus::PharmacistCheck,
            timestamp: now - Duration::hours(5),
            message: Some("Pharmacist identified a potential drug interaction".into()),
        },
    ];
    amoxicillin.pharmacist_message = Some(
        "We've identified a potential interaction with your current medications. \
         Have you taken this medication before?"
            .into(),
    );
    amoxicillin.messages = vec![ChatMessage {
        id: Uuid::new_v4(),
        content: "Hello, we noticed this medication might interact with your current \
                  prescription for Lisinopril. Have you taken Amoxicillin before?"
            .into(),
        timestamp: now - Duration::hours(1),
        is_from_user: false,
    }];

    let family = &user.family_members[0];
    let mut albuterol = sample_prescription(
        family.id,
        &format!("{} {}", family.first_name, family.last_name),
    );
    albuterol.rx_number = "RX567123".into();
    albuterol.medication_name = "Albuterol Inhaler".into();
    albuterol.status = PrescriptionStatus::Completed;
    albuterol.status_history = PrescriptionStatus::ALL
        .iter()
        .enumerate()
        .map(|(i, status)| StatusUpdate {
            status: *status,
            timestamp: now - Duration::days(10 - i as i64),
            message: None,
        })
        .collect();

    vec![metformin, lisinopril, atorvastatin, amoxicillin, albuterol]
}

/// The badge catalog shown on the adherence dashboard.
pub fn sample_badges() -> Vec<Badge> {
    let now = Utc::now();
    let badge = |title: &str,
                 description: &str,
                 image_name: &str,
                 days_ago: i64,
                 category: BadgeCategory,
                 points: i32| Badge {
        id: Uuid::new_v4(),
        title: title.into(),
        description: description.into(),
        image_name: image_name.into(),
        date_earned: now - Duration::days(days_ago),
        category,
        points,
        is_unlocked: false,
    };

    vec![
        badge(
            "Perfect Adherence",
            "Maintained 100% medication adherence for 30 days",
            "badge_adherence_star",
            15,
            BadgeCategory::Adherence,
            100,
        ),
        badge(
            "Flu Fighter",
            "Received your annual flu vaccination",
            "badge_vaccine_flu",
            45,
            BadgeCategory::Vaccine,
            75,
        ),
        badge(
            "Health Scholar",
            "Read 5 health information articles",
            "badge_health_info",
            10,
            BadgeCategory::HealthInfo,
            50,
        ),
        badge(
            "Medication Master",
            "Completed a comprehensive medication review",
            "badge_meds_check",
            30,
            BadgeCategory::MedsCheck,
            125,
        ),
        badge(
            "Family Caretaker",
            "Added and managed family members' medications",
            "badge_family_care",
            5,
            BadgeCategory::Activity,
            75,
        ),
    ]
}

/// The health-info article catalog.
pub fn sample_health_infos() -> Vec<HealthInfo> {
    let now = Utc::now();
    vec![
        HealthInfo {
            id: Uuid::new_v4(),
            title: "World Leukemia Day".into(),
            summary: "Learn about advances in leukemia treatment and awareness".into(),
            content: "September 4th marks World Leukemia Day. Recent advances in targeted \
                      therapies, immunotherapies and CAR-T cell therapy have significantly \
                      improved outcomes for many leukemia patients. Regular check-ups and \
                      blood tests can help detect leukemia early."
                .into(),
            category: HealthInfoCategory::Awareness,
            image_url: Some("leukemia_awareness".into()),
            publish_date: now - Duration::days(2),
            is_read: false,
            read_date: None,
            awards_badge: true,
            related_badge_id: None,
        },
        HealthInfo {
            id: Uuid::new_v4(),
            title: "Managing Type 2 Diabetes".into(),
            summary: "Tips for effectively managing blood sugar levels".into(),
            content: "Monitor your blood sugar regularly, take prescribed medications \
                      consistently, eat a balanced diet and aim for at least 150 minutes of \
                      exercise per week. Small, consistent improvements make a big \
                      difference when living with diabetes."
                .into(),
            category: HealthInfoCategory::Condition,
            image_url: Some("diabetes_management".into()),
            publish_date: now - Duration::days(10),
            is_read: false,
            read_date: None,
            awards_badge: true,
            related_badge_id: None,
        },
        HealthInfo {
            id: Uuid::new_v4(),
            title: "Understanding Your Blood Pressure Medication".into(),
            summary: "Key information about common blood pressure medications".into(),
            content: "ACE inhibitors, ARBs, calcium channel blockers, diuretics and \
                      beta-blockers each work differently to lower blood pressure. Take \
                      your medication exactly as prescribed, even if you feel fine, and \
                      discuss any side effects with your provider rather than stopping on \
                      your own."
                .into(),
            category: HealthInfoCategory::Medication,
            image_url: Some("bp_medication".into()),
            publish_date: now - Duration::days(5),
            is_read: false,
            read_date: None,
            awards_badge: false,
            related_badge_id: None,
        },
    ]
}

/// The minigame catalog.
pub fn sample_minigames() -> Vec<Minigame> {
    vec![
        Minigame {
            id: "game1".into(),
            name: "Med Match".into(),
            description: "Match medications with their purposes. Learn about different \
                          medications while having fun!"
                .into(),
            difficulty_level: "Easy".into(),
            time_to_play: "2-3 min".into(),
            points_to_earn: 50,
            image_name: "game_match".into(),
        },
        Minigame {
            id: "game2".into(),
            name: "Pill Pursuit".into(),
            description: "Race to collect your medications on time while avoiding \
                          obstacles. Reinforces the importance of medication timing."
                .into(),
            difficulty_level: "Medium".into(),
            time_to_play: "3-5 min".into(),
            points_to_earn: 75,
            image_name: "game_pursuit".into(),
        },
        Minigame {
            id: "game3".into(),
            name: "Health Quiz".into(),
            description: "Test your health knowledge with questions about medications, \
                          conditions, and general wellness."
                .into(),
            difficulty_level: "Hard".into(),
            time_to_play: "5-7 min".into(),
            points_to_earn: 100,
            image_name: "game_quiz".into(),
        },
        Minigame {
            id: "game4".into(),
            name: "Body Explorer".into(),
            description: "Learn how medications work in the body with this interactive \
                          educational game."
                .into(),
            difficulty_level: "Medium".into(),
            time_to_play: "4-6 min".into(),
            points_to_earn: 75,
            image_name: "game_explorer".into(),
        },
    ]
}
